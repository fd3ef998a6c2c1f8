//! Wooldridge test for first-order serial correlation in panels
//!
//! Drukker's form: regress first differences of `y` on first differences
//! of the regressors, then regress those residuals on their own lag. Under
//! no serial correlation in the levels the lag coefficient is -0.5.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::base::{ModelError, Result, f_sf};
use crate::lm::ols::ols;
use crate::panel::PanelData;

/// Wooldridge serial-correlation test result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WooldridgeTest {
    /// F(1, groups - 1)
    pub statistic: f64,
    pub p_value: f64,
    /// Estimated AR(1) coefficient of the differenced residuals
    pub rho: f64,
    pub df_num: usize,
    pub df_denom: usize,
}

/// Run the test on the slopes of a panel design
pub fn wooldridge(data: &PanelData) -> Result<WooldridgeTest> {
    let y = data.y();
    let x = data.x();
    let slopes = x.ncols().saturating_sub(1);
    if slopes == 0 {
        return Err(ModelError::InvalidConfig {
            message: "no regressors to difference".to_string(),
        });
    }

    // First differences within each entity, remembering which entity
    let mut dy = Vec::new();
    let mut dx = Vec::new();
    let mut owner = Vec::new();
    for (i, g) in data.groups().iter().enumerate() {
        for r in g.start + 1..g.end {
            dy.push(y[r] - y[r - 1]);
            dx.extend((1..=slopes).map(|j| x[[r, j]] - x[[r - 1, j]]));
            owner.push(i);
        }
    }
    let rows = dy.len();
    if rows <= slopes {
        return Err(ModelError::InsufficientData {
            n_samples: rows,
            n_predictors: slopes,
        });
    }
    let dx = Array2::from_shape_vec((rows, slopes), dx)
        .map_err(|e| ModelError::numerical(e.to_string(), "wooldridge"))?;
    let resid = ols(&Array1::from(dy), &dx)?.residuals;

    // Consecutive residual pairs within an entity
    let mut lead = Vec::new();
    let mut lag = Vec::new();
    let mut cluster = Vec::new();
    for r in 1..rows {
        if owner[r] == owner[r - 1] {
            lead.push(resid[r]);
            lag.push(resid[r - 1]);
            cluster.push(owner[r]);
        }
    }
    let pairs = lead.len();
    if pairs < 2 {
        return Err(ModelError::too_few(
            "Wooldridge",
            2,
            pairs,
            "consecutive differenced residuals",
        ));
    }

    let sxx: f64 = lag.iter().map(|v| v * v).sum();
    if sxx <= 0.0 {
        return Err(ModelError::singular("wooldridge"));
    }
    let rho = lag.iter().zip(&lead).map(|(a, b)| a * b).sum::<f64>() / sxx;

    // Entity-clustered variance of rho
    let mut score = vec![0.0; data.n_entities()];
    for t in 0..pairs {
        score[cluster[t]] += lag[t] * (lead[t] - rho * lag[t]);
    }
    let mut used: Vec<usize> = cluster.clone();
    used.dedup();
    let groups = used.len();
    if groups < 2 {
        return Err(ModelError::too_few(
            "Wooldridge",
            2,
            groups,
            "entities with consecutive differenced residuals",
        ));
    }
    let g = groups as f64;
    let meat: f64 = score.iter().map(|s| s * s).sum();
    let variance = g / (g - 1.0) * meat / (sxx * sxx);

    let statistic = (rho + 0.5).powi(2) / variance;
    let df_denom = groups - 1;
    let p_value = f_sf(statistic, 1.0, df_denom as f64)?;
    debug!(statistic, p_value, rho, groups, "Wooldridge serial correlation test");

    Ok(WooldridgeTest {
        statistic,
        p_value,
        rho,
        df_num: 1,
        df_denom,
    })
}
