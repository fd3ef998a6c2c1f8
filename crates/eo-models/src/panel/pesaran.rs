//! Pesaran CD test for cross-sectional dependence

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::base::{ModelError, Result, normal_two_sided};
use crate::panel::PanelData;

/// Fewest common periods for a pair of entities to count
const MIN_COMMON_PERIODS: usize = 3;

/// Pesaran CD test result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PesaranCd {
    pub statistic: f64,
    pub p_value: f64,
    /// Entity pairs entering the statistic
    pub pairs: usize,
    /// Average pairwise residual correlation
    pub mean_correlation: f64,
}

/// `CD = sqrt(2 / (N (N - 1))) sum_{i<j} sqrt(T_ij) rho_ij`
///
/// `resid` is aligned with the rows of `data`. Pairs sharing fewer than
/// three periods, or with a constant residual over them, are skipped.
pub fn pesaran_cd(data: &PanelData, resid: &Array1<f64>) -> Result<PesaranCd> {
    if resid.len() != data.nobs() {
        return Err(ModelError::InvalidConfig {
            message: format!("{} residuals for {} observations", resid.len(), data.nobs()),
        });
    }
    data.require_entities("Pesaran CD", 2)?;

    // Residuals laid out per entity by period
    let n_periods = data.n_periods();
    let by_entity: Vec<Vec<Option<f64>>> = data
        .groups()
        .iter()
        .map(|g| {
            let mut row = vec![None; n_periods];
            for r in g.clone() {
                row[data.time_codes()[r]] = Some(resid[r]);
            }
            row
        })
        .collect();

    let n = by_entity.len();
    let mut sum = 0.0;
    let mut corr_sum = 0.0;
    let mut pairs = 0usize;
    for i in 0..n {
        for j in i + 1..n {
            let common: Vec<(f64, f64)> = by_entity[i]
                .iter()
                .zip(&by_entity[j])
                .filter_map(|(a, b)| a.zip(*b))
                .collect();
            if common.len() < MIN_COMMON_PERIODS {
                continue;
            }
            if let Some(rho) = correlation(&common) {
                sum += (common.len() as f64).sqrt() * rho;
                corr_sum += rho;
                pairs += 1;
            }
        }
    }

    if pairs == 0 {
        return Err(ModelError::too_few(
            "Pesaran CD",
            1,
            0,
            format!("entity pair sharing {} periods", MIN_COMMON_PERIODS),
        ));
    }

    let nf = n as f64;
    let statistic = (2.0 / (nf * (nf - 1.0))).sqrt() * sum;
    let p_value = normal_two_sided(statistic)?;
    debug!(statistic, p_value, pairs, "Pesaran CD test");

    Ok(PesaranCd {
        statistic,
        p_value,
        pairs,
        mean_correlation: corr_sum / pairs as f64,
    })
}

fn correlation(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len() as f64;
    let (ma, mb) = pairs
        .iter()
        .fold((0.0, 0.0), |(sa, sb), (a, b)| (sa + a / n, sb + b / n));
    let (mut sab, mut saa, mut sbb) = (0.0, 0.0, 0.0);
    for (a, b) in pairs {
        sab += (a - ma) * (b - mb);
        saa += (a - ma).powi(2);
        sbb += (b - mb).powi(2);
    }
    let denom = (saa * sbb).sqrt();
    (denom > 0.0).then(|| sab / denom)
}
