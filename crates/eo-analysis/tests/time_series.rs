//! Time-series pipeline, end to end

mod common;

use common::{Sim, ar1_series, assert_plain, panel, parse, seasonal_series};
use eo_analysis::time_series::run_time_series;
use eo_analysis::{AnalysisConfig, AnalysisRequest, run_analysis};
use eo_core::{DataFrameBuilder, Series};

#[test]
fn test_ar1_with_dates() {
    let df = ar1_series(150, 0.6, 3);
    let request = AnalysisRequest::time_series("y", 1).with_time_col("date");
    let value = parse(&run_analysis(&df, &request));
    assert_plain(&value);

    assert!(value.get("error").is_none(), "{}", value["error"]);
    assert_eq!(value["analysis_type"], "Time Series (Auto-ARIMA)");
    assert_eq!(value["inputs"]["seasonal_period"], 1);
    assert!(value["model_type"].as_str().unwrap().starts_with("ARIMA("));

    let sample = &value["sample"];
    assert_eq!(sample["n_obs"], 150);
    assert_eq!(sample["start"], "2020-01-01T00:00:00");
    assert_eq!(sample["end"], "2020-05-29T00:00:00");

    let adf = &value["stationarity_tests"]["adf_test_original_data"];
    let p = adf["p_value"].as_f64().unwrap();
    let expected = if p < 0.05 { "stationary" } else { "not stationary" };
    assert_eq!(adf["conclusion"], expected);
    assert_eq!(adf["critical_values"].as_object().unwrap().len(), 3);

    let selection = &value["model_selection"];
    assert_eq!(selection["chosen_order"].as_array().unwrap().len(), 3);
    assert!(selection.get("seasonal_order").is_none());
    assert!(selection["models_evaluated"].as_u64().unwrap() >= 1);

    let residual_tests = &value["assumption_tests_on_residuals"];
    for key in ["autocorrelation_ljung_box", "heteroskedasticity_arch"] {
        assert!(residual_tests[key]["statistic"].is_number());
        assert!(residual_tests[key]["conclusion"].is_string());
    }

    let estimation = &value["model_estimation"];
    assert_eq!(estimation["aic"], selection["aic"]);
    assert!(estimation["coefficients"].get("sigma2").is_some());
    assert!(estimation["summary_table"].as_str().unwrap().contains("ARIMA (CSS) Results"));
}

#[test]
fn test_missing_values_dropped_first() {
    let df = ar1_series(120, 0.5, 9);
    let mut y = df.column_f64("y").unwrap().to_vec();
    y[0] = f64::NAN;
    y[40] = f64::NAN;
    let df = DataFrameBuilder::new()
        .with_column("y", Series::float(y))
        .unwrap()
        .build()
        .unwrap();

    let env = run_time_series(&df, "y", 1, None, &AnalysisConfig::default());
    assert!(env.error.is_none(), "{:?}", env.error);
    let value = parse(&eo_analysis::serialize::to_json(&env));
    assert_eq!(value["sample"]["n_obs"], 118);
    // Row positions label the sample without a time column
    assert_eq!(value["sample"]["start"], 1);
    assert_eq!(value["sample"]["end"], 119);
}

#[test]
fn test_summary_names_the_response() {
    let source = ar1_series(100, 0.5, 21);
    let df = DataFrameBuilder::new()
        .with_column("sales", Series::float(source.column_f64("y").unwrap().to_vec()))
        .unwrap()
        .build()
        .unwrap();

    let env = run_time_series(&df, "sales", 1, None, &AnalysisConfig::default());
    assert!(env.error.is_none(), "{:?}", env.error);
    let summary = env.body.model_estimation.as_ref().unwrap().summary_table.to_string();
    assert!(summary.contains("Dep. Variable: sales"), "{summary}");
}

#[test]
fn test_seasonal_period_selects_sarima() {
    let df = seasonal_series(48, 0.1, 4);
    let env = run_time_series(&df, "y", 4, None, &AnalysisConfig::default());

    assert!(env.error.is_none(), "{:?}", env.error);
    assert!(env.model_type.as_deref().unwrap().starts_with("SARIMA("));
    let seasonal = env.body.model_selection.as_ref().unwrap().seasonal_order.unwrap();
    assert_eq!(seasonal.d, 1);
    assert_eq!(seasonal.m, 4);
    assert_eq!(env.inputs.seasonal_period, Some(4));
}

#[test]
fn test_short_series_reports_error() {
    let df = DataFrameBuilder::new()
        .with_column("y", Series::float(vec![1.0, 3.0, 2.0, 5.0]))
        .unwrap()
        .build()
        .unwrap();
    let env = run_time_series(&df, "y", 1, None, &AnalysisConfig::default());

    assert!(env.error.is_some());
    assert!(env.body.model_estimation.is_none());
    assert_eq!(env.body.sample.as_ref().unwrap().n_obs, 4);
}

#[test]
fn test_non_numeric_column_reports_error() {
    let df = panel(Sim::default());
    let env = run_time_series(&df, "firm", 1, None, &AnalysisConfig::default());
    assert!(env.error.as_deref().unwrap().contains("must be numeric"));
    assert!(env.body.sample.is_none());
}
