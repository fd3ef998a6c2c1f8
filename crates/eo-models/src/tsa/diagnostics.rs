//! Residual diagnostics for fitted time series models

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::base::{ModelError, Result, chi2_sf, f_sf};
use crate::lm::ols::ols;
use crate::tsa::lagmat;

/// Ljung-Box portmanteau test for residual autocorrelation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LjungBox {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
}

/// Engle's ARCH-LM test for conditional heteroskedasticity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchLm {
    /// `(n - L) R^2` of the auxiliary regression
    pub statistic: f64,
    pub p_value: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub lags: usize,
}

/// `Q = n (n + 2) sum_k r_k^2 / (n - k)` over lags `1..=lags`
pub fn ljung_box(resid: &Array1<f64>, lags: usize) -> Result<LjungBox> {
    let n = resid.len();
    if lags == 0 {
        return Err(ModelError::InvalidConfig {
            message: "Ljung-Box needs at least one lag".to_string(),
        });
    }
    if n <= lags {
        return Err(ModelError::too_few(
            "Ljung-Box",
            lags + 1,
            n,
            format!("observations for {} lags", lags),
        ));
    }

    let mean = resid.mean().unwrap_or(0.0);
    let centred: Vec<f64> = resid.iter().map(|v| v - mean).collect();
    let denom: f64 = centred.iter().map(|v| v * v).sum();
    if denom <= 0.0 {
        return Err(ModelError::test_failed("Ljung-Box", "residuals have no variance"));
    }

    let nf = n as f64;
    let statistic = (1..=lags)
        .map(|k| {
            let r = centred[k..]
                .iter()
                .zip(&centred[..n - k])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / denom;
            r * r / (nf - k as f64)
        })
        .sum::<f64>()
        * nf
        * (nf + 2.0);

    Ok(LjungBox {
        statistic,
        p_value: chi2_sf(statistic, lags as f64)?,
        lags,
    })
}

/// Regress `e_t^2` on a constant and `nlags` of its own lags
///
/// `nlags = None` uses `min(10, n / 5)`.
pub fn arch_lm(resid: &Array1<f64>, nlags: Option<usize>) -> Result<ArchLm> {
    let n = resid.len();
    if nlags == Some(0) {
        return Err(ModelError::InvalidConfig {
            message: "ARCH-LM needs at least one lag".to_string(),
        });
    }
    let lags = nlags.unwrap_or((n / 5).min(10));
    if lags == 0 {
        return Err(ModelError::too_few("ARCH-LM", 5, n, "residuals"));
    }

    let squared: Vec<f64> = resid.iter().map(|e| e * e).collect();
    let lagged = lagmat(&squared, lags);
    let rows = lagged.nrows();
    if rows <= lags + 1 {
        return Err(ModelError::too_few(
            "ARCH-LM",
            2 * lags + 2,
            n,
            format!("residuals for {} lags", lags),
        ));
    }

    let mut exog = Array2::<f64>::ones((rows, lags + 1));
    for r in 0..rows {
        for j in 0..lags {
            exog[[r, j + 1]] = lagged[[r, j]];
        }
    }
    let dep: Array1<f64> = squared[lags..].iter().copied().collect();

    let fit = ols(&dep, &exog)?;
    let r_squared = fit.r_squared(true);
    if !r_squared.is_finite() {
        return Err(ModelError::test_failed("ARCH-LM", "squared residuals are constant"));
    }

    let statistic = rows as f64 * r_squared;
    let df_resid = (rows - lags - 1) as f64;
    let f_statistic = (r_squared / lags as f64) / ((1.0 - r_squared) / df_resid);

    Ok(ArchLm {
        statistic,
        p_value: chi2_sf(statistic, lags as f64)?,
        f_statistic,
        f_p_value: f_sf(f_statistic, lags as f64, df_resid)?,
        lags,
    })
}
