//! Branching rules of the analyzers, kept free of any fitting
//!
//! Each analyzer runs its tests, reduces them to a few booleans or a test
//! result, and asks these functions what to do next.

use std::fmt;

use eo_models::ModelError;
use eo_models::panel::{HausmanTest, PanelCovariance, PanelModel};
use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;

/// Panel specification picked by the Hausman step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PanelChoice {
    #[serde(rename = "Fixed Effects Model (FEM)")]
    FixedEffects,
    #[serde(rename = "Random Effects Model (REM)")]
    RandomEffects,
}

impl PanelChoice {
    /// Estimator family to re-fit
    pub fn model(self) -> PanelModel {
        match self {
            PanelChoice::FixedEffects => PanelModel::FixedEffects,
            PanelChoice::RandomEffects => PanelModel::RandomEffects,
        }
    }
}

impl fmt::Display for PanelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelChoice::FixedEffects => write!(f, "Fixed Effects Model (FEM)"),
            PanelChoice::RandomEffects => write!(f, "Random Effects Model (REM)"),
        }
    }
}

/// Outcome of the fixed versus random effects decision
#[derive(Debug, Clone, PartialEq)]
pub struct ModelChoice {
    pub model: PanelChoice,
    /// Hausman statistic, absent when the test failed
    pub statistic: Option<f64>,
    /// p-value the decision was taken on; 0.0 after a failed test
    pub p_value: f64,
    pub df: Option<usize>,
    /// Explanation when the test could not be computed
    pub note: Option<String>,
}

/// Fixed effects when Hausman rejects at `alpha`, random effects otherwise
///
/// A failed test is read as a rejection: the p-value is forced to zero
/// and fixed effects chosen, with a note saying so.
pub fn select_panel_model(
    hausman: &std::result::Result<HausmanTest, ModelError>,
    alpha: f64,
) -> ModelChoice {
    let choice = match hausman {
        Ok(test) => ModelChoice {
            model: if test.p_value < alpha {
                PanelChoice::FixedEffects
            } else {
                PanelChoice::RandomEffects
            },
            statistic: Some(test.statistic),
            p_value: test.p_value,
            df: Some(test.df),
            note: None,
        },
        Err(e) => ModelChoice {
            model: PanelChoice::FixedEffects,
            statistic: None,
            p_value: 0.0,
            df: None,
            note: Some(format!(
                "Hausman test could not be computed (Error: {}). Defaulting to FEM.",
                e
            )),
        },
    };
    debug!(model = %choice.model, p_value = choice.p_value, "panel model selected");
    choice
}

/// Covariance for the final panel fit
///
/// Serial correlation or cross-sectional dependence calls for entity
/// clustering and takes priority over heteroskedasticity alone.
pub fn choose_covariance(hetero: bool, autocorr: bool, cross_dep: bool) -> PanelCovariance {
    if autocorr || cross_dep {
        PanelCovariance::Clustered
    } else if hetero {
        PanelCovariance::Robust
    } else {
        PanelCovariance::Unadjusted
    }
}

/// Breusch-Pagan rejection at the configured level
pub fn heteroskedastic(bp_p_value: f64, config: &AnalysisConfig) -> bool {
    config.rejects(bp_p_value)
}

/// Durbin-Watson outside the configured bounds
pub fn autocorrelated(durbin_watson: f64, config: &AnalysisConfig) -> bool {
    let (lower, upper) = config.durbin_watson_bounds;
    durbin_watson < lower || durbin_watson > upper
}

/// Whether the cross-section fit should be redone with HC1 errors
pub fn needs_robust_errors(bp_p_value: f64, durbin_watson: f64, config: &AnalysisConfig) -> bool {
    heteroskedastic(bp_p_value, config) || autocorrelated(durbin_watson, config)
}
