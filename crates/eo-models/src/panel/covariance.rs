//! Coefficient covariance for panel regressions
//!
//! All estimators are computed on the transformed regression the model
//! actually solves (within, quasi-demeaned or raw), with small-sample
//! scaling so that p-values can use Student-t with `df_resid`.

use std::ops::Range;

use ndarray::{Array1, Array2, Axis, s};

use crate::lm::ols::white_covariance;
use crate::panel::PanelCovariance;

/// Inputs shared by the covariance estimators
pub struct CovarianceInput<'a> {
    /// Regressors of the transformed regression
    pub x: &'a Array2<f64>,
    /// Residuals of the transformed regression
    pub resid: &'a Array1<f64>,
    /// `(X'X)^-1` of the transformed regression
    pub xtx_inv: &'a Array2<f64>,
    /// Entity row ranges
    pub groups: &'a [Range<usize>],
    /// Parameters absorbed by the transformation (entity effects)
    pub extra_df: usize,
}

impl CovarianceInput<'_> {
    /// Residual degrees of freedom `n - k - extra_df`
    pub fn df_resid(&self) -> usize {
        let (n, k) = self.x.dim();
        n.saturating_sub(k + self.extra_df)
    }
}

/// Estimate the coefficient covariance
pub fn estimate(kind: PanelCovariance, input: &CovarianceInput<'_>) -> Array2<f64> {
    let (n, k) = input.x.dim();
    let df_resid = input.df_resid().max(1) as f64;
    let nf = n as f64;

    match kind {
        PanelCovariance::Unadjusted => {
            let s2 = input.resid.dot(input.resid) / df_resid;
            input.xtx_inv * s2
        }
        PanelCovariance::Robust => {
            white_covariance(input.x, input.resid, input.xtx_inv) * (nf / df_resid)
        }
        PanelCovariance::Clustered => {
            let g = input.groups.len() as f64;
            let scores = input.x * &input.resid.view().insert_axis(Axis(1));
            let mut meat = Array2::<f64>::zeros((k, k));
            for group in input.groups {
                let sum = scores.slice(s![group.clone(), ..]).sum_axis(Axis(0));
                let col = sum.view().insert_axis(Axis(1));
                meat = meat + col.dot(&col.t());
            }
            // Effects nested in the clusters do not cost degrees of freedom
            let correction = if g > 1.0 && n > k {
                g / (g - 1.0) * (nf - 1.0) / (nf - k as f64)
            } else {
                1.0
            };
            input.xtx_inv.dot(&meat).dot(input.xtx_inv) * correction
        }
    }
}
