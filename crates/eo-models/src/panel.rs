//! Panel data models
//!
//! Estimators for data indexed by (entity, time):
//! - Pooled OLS, ignoring the panel structure
//! - Fixed effects via the entity within-transformation
//! - Random effects with Swamy-Arora variance components
//!
//! Each can report unadjusted, heteroskedasticity-robust or
//! entity-clustered covariance. The specification and residual tests that
//! compare or check these fits live alongside them.

pub mod covariance;
pub mod data;
pub mod estimators;
pub mod hausman;
#[cfg(feature = "panel-diagnostics")]
pub mod pesaran;
#[cfg(feature = "panel-diagnostics")]
pub mod wooldridge;


pub use data::PanelData;
pub use estimators::{PanelEstimator, PanelResult, VarianceComponents};
pub use hausman::{HausmanTest, hausman};
#[cfg(feature = "panel-diagnostics")]
pub use pesaran::{PesaranCd, pesaran_cd};
#[cfg(feature = "panel-diagnostics")]
pub use wooldridge::{WooldridgeTest, wooldridge};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Panel model family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelModel {
    Pooled,
    FixedEffects,
    RandomEffects,
}

impl fmt::Display for PanelModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelModel::Pooled => write!(f, "Pooled OLS"),
            PanelModel::FixedEffects => write!(f, "Fixed Effects"),
            PanelModel::RandomEffects => write!(f, "Random Effects"),
        }
    }
}

/// Coefficient covariance estimator for panel models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelCovariance {
    /// Classical, homoskedastic
    #[default]
    Unadjusted,
    /// White heteroskedasticity-robust
    Robust,
    /// Clustered by entity
    Clustered,
}

impl fmt::Display for PanelCovariance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelCovariance::Unadjusted => write!(f, "Unadjusted"),
            PanelCovariance::Robust => write!(f, "Robust"),
            PanelCovariance::Clustered => write!(f, "Clustered"),
        }
    }
}
