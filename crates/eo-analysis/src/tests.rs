//! Tests for decisions, envelopes and serialization

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use eo_core::IndexValue;
use eo_models::panel::{HausmanTest, PanelCovariance};
use eo_models::{Coefficient, ModelError, ModelStatistics, ModelSummary, ModelType};
use ndarray::array;
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::AnalysisConfig;
use crate::decision::{
    PanelChoice, autocorrelated, choose_covariance, needs_robust_errors, select_panel_model,
};
use crate::envelope::{
    AnalysisOutcome, AnalysisType, CrossSectionBody, DiagnosticOutcome, Envelope, Inputs,
    MISSING_FEATURE, Notes, TestStatistic,
};
use crate::error::AnalysisError;
use crate::router::{AnalysisRequest, DataType};
use crate::serialize::{self, normalize, to_json};

fn parse(json: &str) -> Value {
    serde_json::from_str(json).unwrap()
}

// ==================== Decisions ====================

#[test]
fn test_choose_covariance_priority() {
    assert_eq!(choose_covariance(false, false, false), PanelCovariance::Unadjusted);
    assert_eq!(choose_covariance(true, false, false), PanelCovariance::Robust);
    assert_eq!(choose_covariance(false, true, false), PanelCovariance::Clustered);
    assert_eq!(choose_covariance(false, false, true), PanelCovariance::Clustered);
    // Correlation problems override heteroskedasticity
    assert_eq!(choose_covariance(true, true, false), PanelCovariance::Clustered);
    assert_eq!(choose_covariance(true, false, true), PanelCovariance::Clustered);
}

#[test]
fn test_select_panel_model_from_test() {
    let significant = Ok(HausmanTest {
        statistic: 15.2,
        p_value: 0.0005,
        df: 2,
    });
    let choice = select_panel_model(&significant, 0.05);
    assert_eq!(choice.model, PanelChoice::FixedEffects);
    assert_eq!(choice.statistic, Some(15.2));
    assert_eq!(choice.df, Some(2));
    assert!(choice.note.is_none());

    let insignificant = Ok(HausmanTest {
        statistic: 0.8,
        p_value: 0.67,
        df: 2,
    });
    let choice = select_panel_model(&insignificant, 0.05);
    assert_eq!(choice.model, PanelChoice::RandomEffects);
    assert_abs_diff_eq!(choice.p_value, 0.67);
}

#[test]
fn test_select_panel_model_fallback() {
    let failed = Err(ModelError::SingularMatrix {
        operation: "hausman".to_string(),
    });
    let choice = select_panel_model(&failed, 0.05);
    assert_eq!(choice.model, PanelChoice::FixedEffects);
    assert_eq!(choice.p_value, 0.0);
    assert!(choice.statistic.is_none());
    let note = choice.note.unwrap();
    assert!(note.starts_with("Hausman test could not be computed (Error: Singular matrix"));
    assert!(note.ends_with("Defaulting to FEM."));
}

#[test]
fn test_panel_choice_labels() {
    assert_eq!(PanelChoice::FixedEffects.to_string(), "Fixed Effects Model (FEM)");
    assert_eq!(
        serde_json::to_value(PanelChoice::RandomEffects).unwrap(),
        json!("Random Effects Model (REM)")
    );
}

#[test]
fn test_needs_robust_errors() {
    let config = AnalysisConfig::default();
    assert!(!needs_robust_errors(0.5, 2.0, &config));
    assert!(needs_robust_errors(0.01, 2.0, &config));
    assert!(needs_robust_errors(0.5, 1.2, &config));
    assert!(needs_robust_errors(0.5, 2.7, &config));
    // Bounds are inclusive
    assert!(!autocorrelated(1.5, &config));
    assert!(!autocorrelated(2.5, &config));
}

// ==================== Envelope ====================

#[test]
fn test_test_statistic_conclusion() {
    let t = TestStatistic::new(-4.1, 0.001).concluding(0.05, "stationary", "not stationary");
    assert_eq!(t.conclusion.as_deref(), Some("stationary"));
    let t = TestStatistic::new(-1.2, 0.6).concluding(0.05, "stationary", "not stationary");
    assert_eq!(t.conclusion.as_deref(), Some("not stationary"));

    let dw = TestStatistic::statistic_only(1.9);
    assert!(!dw.rejects(0.05));
    assert_eq!(serde_json::to_value(&dw).unwrap(), json!({"statistic": 1.9}));
}

#[test]
fn test_diagnostic_outcome_wire_form() {
    let computed = DiagnosticOutcome::Computed(TestStatistic::new(3.0, 0.01));
    assert_eq!(
        serde_json::to_value(&computed).unwrap(),
        json!({"statistic": 3.0, "p_value": 0.01})
    );
    assert!(computed.flags(0.05));
    assert!(!computed.flags(0.001));

    let missing: DiagnosticOutcome<TestStatistic> =
        DiagnosticOutcome::Unavailable(MISSING_FEATURE.to_string());
    assert_eq!(
        serde_json::to_value(&missing).unwrap(),
        json!({"error": "This feature requires panel diagnostics support"})
    );
    assert!(!missing.flags(0.05));

    let failed: DiagnosticOutcome<TestStatistic> =
        DiagnosticOutcome::from_result(Err::<TestStatistic, _>("singular design"));
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        json!({"error": "Failed: singular design"})
    );
}

#[test]
fn test_notes_keep_order() {
    let mut notes = Notes::default();
    assert!(notes.is_empty());
    notes.push("first");
    notes.push(String::from("second"));
    assert_eq!(notes.len(), 2);
    assert_eq!(notes.iter().collect::<Vec<_>>(), vec!["first", "second"]);
    assert!(notes.mentions("sec"));
    assert_eq!(serde_json::to_value(&notes).unwrap(), json!(["first", "second"]));
}

#[test]
fn test_envelope_shape() {
    let inputs = Inputs {
        y: "y".to_string(),
        x: Some(vec!["x1".to_string()]),
        ..Inputs::default()
    };
    let mut env: Envelope<CrossSectionBody> = Envelope::new(AnalysisType::CrossSection, inputs);
    env.notes.push("a note");

    let value = parse(&to_json(&env));
    assert_eq!(value["analysis_type"], "Cross-Section");
    assert_eq!(value["inputs"], json!({"y": "y", "x": ["x1"]}));
    assert_eq!(value["notes"], json!(["a note"]));
    assert_eq!(value["assumption_tests"], json!({}));
    assert!(value.get("model_estimation").is_none());
    assert!(value.get("error").is_none());

    env.fail(&AnalysisError::InvalidRequest("no regressors".to_string()));
    assert!(env.is_error());
    let value = parse(&to_json(&env));
    assert_eq!(value["error"], "Invalid request: no regressors");
}

#[test]
fn test_rejection_is_error_only() {
    let outcome: AnalysisOutcome = AnalysisError::UnknownDataType("spatial".to_string()).into();
    assert_eq!(outcome.error(), Some("Unknown data type: spatial"));
    assert!(outcome.notes().is_none());
    assert_eq!(parse(&outcome.to_json()), json!({"error": "Unknown data type: spatial"}));
}

// ==================== Serialization ====================

#[derive(Serialize)]
struct Wrapped {
    #[serde(with = "serialize::array1")]
    vector: ndarray::Array1<f64>,
    #[serde(with = "serialize::array2")]
    matrix: ndarray::Array2<f64>,
    #[serde(with = "serialize::timestamp")]
    stamp: chrono::NaiveDateTime,
    #[serde(with = "serialize::summary_text")]
    summary: ModelSummary,
    labels: Vec<Label>,
    plain: f64,
}

#[derive(Serialize)]
struct Label(#[serde(with = "serialize::label")] IndexValue);

fn wrapped() -> Wrapped {
    let stamp = NaiveDate::from_ymd_opt(2021, 3, 4)
        .unwrap()
        .and_hms_opt(5, 6, 7)
        .unwrap();
    Wrapped {
        vector: array![1.5, f64::NAN],
        matrix: array![[1.0, 2.0], [3.0, f64::INFINITY]],
        stamp,
        summary: ModelSummary::new(
            ModelType::Ols,
            "y",
            "nonrobust",
            10,
            vec![Coefficient::new("const", 1.25)],
            ModelStatistics::default(),
        ),
        labels: vec![
            Label(IndexValue::Integer(7)),
            Label(IndexValue::Float(2.5)),
            Label(IndexValue::String("firm01".to_string())),
            Label(IndexValue::Datetime(stamp)),
        ],
        plain: f64::NEG_INFINITY,
    }
}

#[test]
fn test_adapters() {
    let value = parse(&to_json(&wrapped()));
    assert_eq!(value["vector"], json!([1.5, null]));
    assert_eq!(value["matrix"], json!([[1.0, 2.0], [3.0, null]]));
    assert_eq!(value["stamp"], "2021-03-04T05:06:07");
    assert_eq!(value["labels"], json!([7, 2.5, "firm01", "2021-03-04T05:06:07"]));
    assert!(value["plain"].is_null());

    let text = value["summary"].as_str().unwrap();
    assert!(text.starts_with("OLS Regression Results"));
    assert!(text.contains("const"));
}

#[test]
fn test_normalize_leaves_plain_values() {
    let value = json!({"a": [1, 2.5, "x", null, true], "b": {"c": -3}});
    assert_eq!(normalize(value.clone()), value);
}

#[test]
fn test_to_json_is_pretty() {
    let json = to_json(&json!({"a": 1}));
    assert_eq!(json, "{\n  \"a\": 1\n}");
}

#[test]
fn test_to_json_keeps_insertion_order() {
    let mut coefficients = indexmap::IndexMap::new();
    coefficients.insert("const", 1.0);
    coefficients.insert("zeta", 2.0);
    coefficients.insert("alpha", f64::NAN);
    let json = to_json(&coefficients);
    assert_eq!(json, "{\n  \"const\": 1.0,\n  \"zeta\": 2.0,\n  \"alpha\": null\n}");
}

// ==================== Router and config ====================

#[test]
fn test_data_type_parsing() {
    assert_eq!("cross_section".parse::<DataType>().unwrap(), DataType::CrossSection);
    assert_eq!(" Time_Series ".parse::<DataType>().unwrap(), DataType::TimeSeries);
    assert_eq!("PANEL".parse::<DataType>().unwrap(), DataType::Panel);

    let err = "pooled".parse::<DataType>().unwrap_err();
    assert_eq!(err.to_string(), "Unknown data type: pooled");
}

#[test]
fn test_request_deserialization() {
    let request: AnalysisRequest =
        serde_json::from_str(r#"{"y_var": "sales", "data_type": "time_series"}"#).unwrap();
    assert_eq!(request.y_var, "sales");
    assert!(request.x_vars.is_empty());
    assert!(request.seasonal_period.is_none());

    let panel = AnalysisRequest::panel("y", ["x1", "x2"], "firm", "year");
    assert_eq!(panel.data_type, "panel");
    assert_eq!(panel.x_vars, vec!["x1", "x2"]);
    assert_eq!(panel.entity_col.as_deref(), Some("firm"));
}

#[test]
fn test_config_defaults() {
    let config = AnalysisConfig::default();
    assert_eq!(config.significance_level, 0.05);
    assert_eq!(config.vif_threshold, 10.0);
    assert_eq!(config.durbin_watson_bounds, (1.5, 2.5));
    assert_eq!(config.ljung_box_lags, 10);
    assert!(config.arch_lags.is_none());
    assert_eq!(config.arima.max_p, 3);
    assert_eq!(config.arima.max_q, 3);
    assert!(config.arima.stepwise);

    let partial: AnalysisConfig =
        serde_json::from_str(r#"{"significance_level": 0.1, "arch_lags": 4}"#).unwrap();
    assert_eq!(partial.significance_level, 0.1);
    assert_eq!(partial.arch_lags, Some(4));
    assert_eq!(partial.vif_threshold, 10.0);
    assert_eq!(partial.arima, config.arima);
}
