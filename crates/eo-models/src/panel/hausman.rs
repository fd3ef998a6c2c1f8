//! Hausman specification test, fixed versus random effects

use ndarray::s;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::base::{ModelError, Result, chi2_sf};
use crate::linalg;
use crate::panel::{PanelModel, PanelResult};

/// Hausman test result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HausmanTest {
    pub statistic: f64,
    pub p_value: f64,
    pub df: usize,
}

/// `H = d' (V_fe - V_re)^-1 d` over the slope coefficients
///
/// A significant statistic rejects consistency of the random-effects
/// estimator. Fails when the variance difference cannot be inverted or
/// yields a negative statistic.
pub fn hausman(fixed: &PanelResult, random: &PanelResult) -> Result<HausmanTest> {
    if fixed.model != PanelModel::FixedEffects || random.model != PanelModel::RandomEffects {
        return Err(ModelError::InvalidConfig {
            message: "Hausman test compares a fixed-effects and a random-effects fit".to_string(),
        });
    }
    if fixed.names != random.names {
        return Err(ModelError::InvalidConfig {
            message: "models have different regressors".to_string(),
        });
    }

    let k = fixed.params.len();
    if k < 2 {
        return Err(ModelError::InvalidConfig {
            message: "no slope coefficients to compare".to_string(),
        });
    }

    let d = &fixed.params.slice(s![1..]) - &random.params.slice(s![1..]);
    let v = &fixed.covariance.slice(s![1.., 1..]) - &random.covariance.slice(s![1.., 1..]);
    let v_inv = linalg::inv(&v, "hausman")?;

    let statistic = d.dot(&v_inv.dot(&d));
    if !statistic.is_finite() || statistic < 0.0 {
        return Err(ModelError::numerical(
            format!("statistic is {:.6}; variance difference is not positive definite", statistic),
            "hausman",
        ));
    }

    let df = k - 1;
    let p_value = chi2_sf(statistic, df as f64)?;
    debug!(statistic, p_value, df, "Hausman test");

    Ok(HausmanTest {
        statistic,
        p_value,
        df,
    })
}
