//! Time-series analyzer: ADF, automatic ARIMA order and residual checks

use eo_core::{DataFrame, IndexValue};
use eo_models::tsa::{AutoArima, adfuller, arch_lm, ljung_box};
use ndarray::Array1;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::envelope::{
    AdfBlock, AnalysisType, Envelope, Inputs, ModelEstimation, ModelSelection, Sample,
    TestStatistic, TimeSeriesBody,
};
use crate::error::Result;

/// Analyse one column as a univariate series
///
/// Missing values are dropped first. `seasonal_period` of 1 means no
/// seasonality. `time_col`, when given, labels the sample bounds; row
/// positions are used otherwise. Residual problems are reported, never
/// corrected.
pub fn run_time_series(
    data: &DataFrame,
    y_var: &str,
    seasonal_period: usize,
    time_col: Option<&str>,
    config: &AnalysisConfig,
) -> Envelope<TimeSeriesBody> {
    info!(analysis = "time-series", y = y_var, seasonal_period, "analysis started");
    let inputs = Inputs {
        y: y_var.to_string(),
        seasonal_period: Some(seasonal_period),
        ..Inputs::default()
    };
    let mut env = Envelope::new(AnalysisType::TimeSeries, inputs);

    if let Err(e) = pipeline(data, y_var, seasonal_period, time_col, config, &mut env) {
        warn!(error = %e, "time-series analysis aborted");
        env.fail(&e);
    }
    info!(analysis = "time-series", failed = env.is_error(), "analysis finished");
    env
}

fn pipeline(
    data: &DataFrame,
    y_var: &str,
    seasonal_period: usize,
    time_col: Option<&str>,
    config: &AnalysisConfig,
    env: &mut Envelope<TimeSeriesBody>,
) -> Result<()> {
    let alpha = config.significance_level;
    let column = data.column_f64(y_var)?;
    let rows: Vec<usize> = (0..column.len()).filter(|&i| !column[i].is_nan()).collect();
    let series: Array1<f64> = rows.iter().map(|&i| column[i]).collect();
    debug!(n_obs = series.len(), dropped = column.len() - series.len(), "series prepared");

    if let (Some(&first), Some(&last)) = (rows.first(), rows.last()) {
        env.body.sample = Some(Sample {
            n_obs: rows.len(),
            start: row_label(data, time_col, first)?,
            end: row_label(data, time_col, last)?,
        });
    }

    let adf = adfuller(&series, None)?;
    debug!(statistic = adf.statistic, p_value = adf.p_value, "ADF on the original series");
    env.body.stationarity_tests.adf_test_original_data = Some(AdfBlock::new(&adf, alpha));

    let auto = AutoArima::new(config.arima.clone())
        .seasonal_period(seasonal_period)
        .dependent(y_var)
        .fit(&series)?;
    let model = &auto.model;
    env.model_type = Some(model.label());
    env.body.model_selection = Some(ModelSelection {
        chosen_order: auto.order,
        seasonal_order: auto.seasonal_order.is_seasonal().then_some(auto.seasonal_order),
        aic: model.aic(),
        models_evaluated: auto.models_evaluated,
    });

    let residual_tests = &mut env.body.assumption_tests_on_residuals;
    let lb = ljung_box(&model.residuals, config.ljung_box_lags)?;
    debug!(statistic = lb.statistic, p_value = lb.p_value, lags = lb.lags, "Ljung-Box");
    residual_tests.autocorrelation_ljung_box = Some(
        TestStatistic::new(lb.statistic, lb.p_value).concluding(
            alpha,
            "residuals autocorrelated",
            "residuals independent",
        ),
    );

    let arch = arch_lm(&model.residuals, config.arch_lags)?;
    debug!(statistic = arch.statistic, p_value = arch.p_value, lags = arch.lags, "ARCH-LM");
    residual_tests.heteroskedasticity_arch = Some(
        TestStatistic::new(arch.statistic, arch.p_value).concluding(
            alpha,
            "residuals heteroskedastic",
            "residuals homoskedastic",
        ),
    );

    env.body.model_estimation = Some(ModelEstimation::from_arima(model));
    Ok(())
}

fn row_label(data: &DataFrame, time_col: Option<&str>, row: usize) -> Result<IndexValue> {
    let Some(col) = time_col else {
        return Ok(IndexValue::Integer(row as i64));
    };
    Ok(data
        .column(col)?
        .get(row)
        .map(IndexValue::from)
        .unwrap_or(IndexValue::Integer(row as i64)))
}
