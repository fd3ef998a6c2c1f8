//! Panel pipeline, end to end

mod common;

use common::{Sim, assert_plain, degenerate_panel, panel, parse};
use eo_analysis::decision::PanelChoice;
use eo_analysis::panel::run_panel;
use eo_analysis::{AnalysisConfig, AnalysisRequest, run_analysis};
use eo_models::panel::PanelCovariance;

fn request() -> AnalysisRequest {
    AnalysisRequest::panel("y", ["x1", "x2"], "firm", "year")
}

#[test]
fn test_panel_envelope() {
    let df = panel(Sim::default());
    let value = parse(&run_analysis(&df, &request()));
    assert_plain(&value);

    assert!(value.get("error").is_none(), "{}", value["error"]);
    assert_eq!(value["analysis_type"], "Panel Data");
    assert_eq!(value["inputs"]["entity"], "firm");
    assert_eq!(value["inputs"]["time"], "year");

    let models: Vec<&str> = value["models"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(models, vec!["cem_pooled_ols", "fem_fixed_effects", "rem_random_effects"]);
    assert!(value["models"]["fem_fixed_effects"].as_str().unwrap().contains("PanelOLS Estimation"));

    let hausman = &value["model_selection_tests"]["hausman_test"];
    assert!(hausman["p_value"].is_number());
    if hausman["statistic"].is_number() {
        assert_eq!(hausman["df"], 2);
    }

    let chosen = value["chosen_model"].as_str().unwrap();
    assert!(chosen == "Fixed Effects Model (FEM)" || chosen == "Random Effects Model (REM)");
    let covariance = value["covariance_type"].as_str().unwrap();
    let label = match covariance {
        "unadjusted" => "Unadjusted",
        "robust" => "Robust",
        "clustered" => "Clustered",
        other => panic!("unexpected covariance {other}"),
    };
    assert_eq!(value["model_type"], format!("{chosen} with {label} standard errors"));

    let diagnostics = value["final_model_diagnostics"].as_object().unwrap();
    assert_eq!(diagnostics.len(), 3);
    for block in diagnostics.values() {
        assert!(block.get("statistic").is_some() || block.get("error").is_some());
    }

    let estimation = &value["final_model_estimation"];
    let keys: Vec<&str> = estimation["coefficients"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["const", "x1", "x2"]);
    assert!(estimation["r_squared_within"].is_number());
    assert!(estimation["r_squared_overall"].is_number());
    assert!(estimation["p_values"]["x1"].is_number());
}

#[test]
fn test_covariance_note_matches_choice() {
    let df = panel(Sim {
        seed: 9,
        ..Sim::default()
    });
    let env = run_panel(&df, "y", &["x1", "x2"], "firm", "year", &AnalysisConfig::default());
    assert!(env.error.is_none(), "{:?}", env.error);

    let covariance = env.body.covariance_type.unwrap();
    match covariance {
        PanelCovariance::Clustered => assert!(env.notes.mentions("clustered standard errors")),
        PanelCovariance::Robust => assert!(env.notes.mentions("robust standard errors")),
        PanelCovariance::Unadjusted => assert!(!env.notes.mentions("standard errors")),
    }
    let estimation = env.body.final_model_estimation.as_ref().unwrap();
    assert_eq!(estimation.summary_table.covariance, covariance.to_string());
}

#[cfg(feature = "panel-diagnostics")]
#[test]
fn test_serial_correlation_overrides_heteroskedasticity() {
    let df = panel(Sim {
        entities: 30,
        periods: 10,
        seed: 5,
        ar: 0.9,
        hetero: 2.0,
    });
    let env = run_panel(&df, "y", &["x1", "x2"], "firm", "year", &AnalysisConfig::default());
    assert!(env.error.is_none(), "{:?}", env.error);

    let wooldridge = env.body.final_model_diagnostics.autocorrelation_wooldridge.as_ref().unwrap();
    assert!(wooldridge.flags(0.05));
    assert_eq!(env.body.covariance_type, Some(PanelCovariance::Clustered));
    assert!(env.notes.mentions("clustered standard errors"));
    assert!(!env.notes.mentions("Using robust standard errors"));
    assert!(env.model_type.as_deref().unwrap().ends_with("with Clustered standard errors"));
}

#[test]
fn test_hausman_failure_defaults_to_fixed_effects() {
    let df = degenerate_panel();
    let env = run_panel(&df, "y", &["x"], "id", "t", &AnalysisConfig::default());

    assert!(env.error.is_none(), "{:?}", env.error);
    assert_eq!(env.body.chosen_model, Some(PanelChoice::FixedEffects));
    assert!(env.notes.mentions("Hausman test could not be computed"));
    assert!(env.notes.mentions("Defaulting to FEM."));

    let value = parse(&eo_analysis::serialize::to_json(&env));
    assert_eq!(value["chosen_model"], "Fixed Effects Model (FEM)");
    let hausman = &value["model_selection_tests"]["hausman_test"];
    assert!(hausman["statistic"].is_null());
    assert_eq!(hausman["p_value"], 0.0);
    // Within slope of the degenerate panel is exactly one
    let slope = value["final_model_estimation"]["coefficients"]["x"].as_f64().unwrap();
    assert!((slope - 1.0).abs() < 1e-9);
}

#[test]
fn test_missing_identifier_column() {
    let df = panel(Sim::default());
    let request = AnalysisRequest::panel("y", ["x1", "x2"], "company", "year");
    let value = parse(&run_analysis(&df, &request));

    let error = value["error"].as_str().unwrap();
    assert!(error.contains("'company'"));
    assert!(error.contains("Columns read"));
    for column in ["firm", "year", "x1", "x2", "y"] {
        assert!(error.contains(column));
    }
    assert!(value.get("final_model_estimation").is_none());
    assert_eq!(value["models"], serde_json::json!({}));
}

#[test]
fn test_router_requires_identifiers() {
    let df = panel(Sim::default());
    let mut request = request();
    request.time_col = None;
    let value = parse(&run_analysis(&df, &request));
    assert_eq!(
        value,
        serde_json::json!({"error": "Panel analysis requires 'entity_col' and 'time_col'."})
    );
}

#[test]
fn test_random_effects_reports_variance_components() {
    let df = panel(Sim::default());
    let env = run_panel(&df, "y", &["x1", "x2"], "firm", "year", &AnalysisConfig::default());
    let value = parse(&eo_analysis::serialize::to_json(&env));
    match env.body.chosen_model {
        Some(PanelChoice::RandomEffects) => {
            let theta = value["variance_components"]["theta"].as_array().unwrap();
            assert_eq!(theta.len(), 10);
        }
        _ => assert!(value.get("variance_components").is_none()),
    }
}

#[cfg(not(feature = "panel-diagnostics"))]
#[test]
fn test_missing_feature_marker() {
    let df = panel(Sim::default());
    let value = parse(&run_analysis(&df, &request()));
    let diagnostics = &value["final_model_diagnostics"];
    for key in ["autocorrelation_wooldridge", "cross_sectional_dependence_pesaran_cd"] {
        assert_eq!(
            diagnostics[key]["error"],
            "This feature requires panel diagnostics support"
        );
    }
    assert!(value.get("error").is_none());
}

#[cfg(feature = "panel-diagnostics")]
#[test]
fn test_failed_diagnostics_leave_pipeline_running() {
    let df = panel(Sim {
        entities: 8,
        periods: 2,
        ..Sim::default()
    });
    // Any Breusch-Pagan p-value below one counts as heteroskedastic
    let config = AnalysisConfig {
        significance_level: 0.999_999,
        ..AnalysisConfig::default()
    };
    let env = run_panel(&df, "y", &["x1", "x2"], "firm", "year", &config);
    assert!(env.error.is_none(), "{:?}", env.error);

    let diagnostics = &env.body.final_model_diagnostics;
    let bp = diagnostics.heteroskedasticity_breusch_pagan.as_ref().unwrap();
    assert!(bp.computed().is_some());
    assert!(bp.flags(config.significance_level));

    let value = parse(&eo_analysis::serialize::to_json(&env));
    let blocks = &value["final_model_diagnostics"];
    assert!(blocks["heteroskedasticity_breusch_pagan"]["statistic"].is_number());
    for (key, test) in [
        ("autocorrelation_wooldridge", "Wooldridge"),
        ("cross_sectional_dependence_pesaran_cd", "Pesaran CD"),
    ] {
        let error = blocks[key]["error"].as_str().unwrap();
        assert!(error.starts_with("Failed: "), "{error}");
        assert!(error.contains(test), "{error}");
    }

    // Only heteroskedasticity is flagged, so errors are robust, not clustered
    assert_eq!(env.body.covariance_type, Some(PanelCovariance::Robust));
    assert!(env.notes.mentions("Using robust standard errors."));
    assert!(!env.notes.mentions("clustered"));
    assert!(env.model_type.as_deref().unwrap().ends_with("with Robust standard errors"));
    let estimation = env.body.final_model_estimation.as_ref().unwrap();
    assert_eq!(estimation.summary_table.covariance, PanelCovariance::Robust.to_string());
    assert!(value.get("error").is_none());
}
