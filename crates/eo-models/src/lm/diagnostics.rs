//! Linear model diagnostics
//!
//! This module provides the assumption checks run against a fitted linear
//! regression: multicollinearity, heteroskedasticity, serial correlation
//! and normality of the residuals.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::base::{ModelError, Result, chi2_sf, f_sf};
use crate::lm::ols::{has_constant, ols};
use eo_core::design::CONSTANT;

/// Variance Inflation Factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VIF {
    pub variable: String,
    pub vif: f64,
    pub tolerance: f64,
}

/// Durbin-Watson statistic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurbinWatson {
    pub statistic: f64,
    /// First-order autocorrelation implied by the statistic, `1 - d/2`
    pub autocorrelation: f64,
}

/// Breusch-Pagan test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreuschPagan {
    /// Lagrange multiplier statistic, `n R^2`
    pub statistic: f64,
    pub p_value: f64,
    /// F form of the auxiliary regression
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub df: usize,
}

/// Jarque-Bera test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JarqueBera {
    pub statistic: f64,
    pub p_value: f64,
    pub skew: f64,
    /// Pearson kurtosis (3 for a normal sample)
    pub kurtosis: f64,
}

/// Diagnostic analyzer
pub struct Diagnostics;

impl Diagnostics {
    /// Calculate Variance Inflation Factors
    ///
    /// One entry per column of `x` other than the intercept. Column `j` is
    /// regressed on all remaining columns, constant included.
    pub fn vif(x: &Array2<f64>, variable_names: &[String]) -> Result<Vec<VIF>> {
        let p = x.ncols();
        if p < 2 {
            return Err(ModelError::InsufficientData {
                n_samples: x.nrows(),
                n_predictors: p,
            });
        }

        let mut vifs = Vec::with_capacity(p);

        for j in 0..p {
            let name = variable_names
                .get(j)
                .cloned()
                .unwrap_or_else(|| format!("x{}", j));
            if name == CONSTANT {
                continue;
            }

            let others: Vec<usize> = (0..p).filter(|&k| k != j).collect();
            let x_other = x.select(Axis(1), &others);
            let y = x.column(j).to_owned();

            let fit = ols(&y, &x_other)?;
            let r2 = fit.r_squared(has_constant(&x_other));
            let vif = 1.0 / (1.0 - r2);

            vifs.push(VIF {
                variable: name,
                vif,
                tolerance: 1.0 / vif,
            });
        }

        Ok(vifs)
    }

    /// Calculate Durbin-Watson statistic
    pub fn durbin_watson(residuals: &Array1<f64>) -> DurbinWatson {
        let n = residuals.len();
        let mut sum_sq_diff = 0.0;

        for i in 1..n {
            let diff = residuals[i] - residuals[i - 1];
            sum_sq_diff += diff * diff;
        }

        let sum_sq = residuals.dot(residuals);
        let dw = sum_sq_diff / sum_sq;

        DurbinWatson {
            statistic: dw,
            autocorrelation: 1.0 - dw / 2.0,
        }
    }

    /// Breusch-Pagan test, Koenker's studentised form
    ///
    /// Regresses the squared residuals on `x` (which must carry the constant)
    /// and reports `LM = n R^2 ~ chi2(k - 1)`.
    pub fn breusch_pagan(residuals: &Array1<f64>, x: &Array2<f64>) -> Result<BreuschPagan> {
        let (n, k) = x.dim();
        if k < 2 || n <= k {
            return Err(ModelError::InsufficientData {
                n_samples: n,
                n_predictors: k,
            });
        }

        let e2 = residuals.mapv(|e| e * e);
        let fit = ols(&e2, x)?;
        let r2 = fit.r_squared(true);

        let df = k - 1;
        let lm = n as f64 * r2;
        let p_value = chi2_sf(lm, df as f64)?;

        let df_resid = (n - k) as f64;
        let f_statistic = (r2 / df as f64) / ((1.0 - r2) / df_resid);
        let f_p_value = f_sf(f_statistic, df as f64, df_resid)?;

        Ok(BreuschPagan {
            statistic: lm,
            p_value,
            f_statistic,
            f_p_value,
            df,
        })
    }

    /// Jarque-Bera test from the biased sample skewness and kurtosis
    pub fn jarque_bera(residuals: &Array1<f64>) -> Result<JarqueBera> {
        let n = residuals.len();
        if n < 3 {
            return Err(ModelError::too_few("Jarque-Bera", 3, n, "residuals"));
        }

        let nf = n as f64;
        let mean = residuals.sum() / nf;
        let centered = residuals.mapv(|e| e - mean);
        let m2 = centered.mapv(|e| e.powi(2)).sum() / nf;
        let m3 = centered.mapv(|e| e.powi(3)).sum() / nf;
        let m4 = centered.mapv(|e| e.powi(4)).sum() / nf;

        let skew = m3 / m2.powf(1.5);
        let kurtosis = m4 / (m2 * m2);
        let statistic = nf / 6.0 * (skew.powi(2) + (kurtosis - 3.0).powi(2) / 4.0);
        let p_value = chi2_sf(statistic, 2.0)?;

        Ok(JarqueBera {
            statistic,
            p_value,
            skew,
            kurtosis,
        })
    }
}
