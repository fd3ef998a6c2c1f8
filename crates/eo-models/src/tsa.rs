//! Time series models
//!
//! - Augmented Dickey-Fuller unit-root test
//! - ARIMA / seasonal ARIMA estimated by conditional sum of squares
//! - Automatic order selection (stepwise or exhaustive)
//! - Residual diagnostics: Ljung-Box and ARCH-LM

pub mod adf;
pub mod arima;
pub mod auto_arima;
pub mod diagnostics;


pub use adf::{AdfTest, CriticalValues, adfuller};
pub use arima::{Arima, ArimaOrder, ArimaResult, SeasonalOrder};
pub use auto_arima::{AutoArima, AutoArimaConfig, AutoArimaResult, InformationCriterion};
pub use diagnostics::{ArchLm, LjungBox, arch_lm, ljung_box};

use ndarray::Array2;

/// First differences applied `d` times
pub fn diff(x: &[f64], d: usize) -> Vec<f64> {
    seasonal_diff(x, 1, d)
}

/// Lag-`m` differences applied `times` times
pub fn seasonal_diff(x: &[f64], m: usize, times: usize) -> Vec<f64> {
    let mut out = x.to_vec();
    for _ in 0..times {
        if out.len() <= m {
            return Vec::new();
        }
        out = (m..out.len()).map(|t| out[t] - out[t - m]).collect();
    }
    out
}

/// Lagged copies of `x`, trimmed at both ends
///
/// Row `r` holds `x[t-1], ..., x[t-maxlag]` for `t = maxlag + r`.
pub(crate) fn lagmat(x: &[f64], maxlag: usize) -> Array2<f64> {
    let rows = x.len().saturating_sub(maxlag);
    Array2::from_shape_fn((rows, maxlag), |(r, j)| x[maxlag + r - j - 1])
}

/// Whether every value equals the first one
pub(crate) fn is_constant(x: &[f64]) -> bool {
    x.windows(2).all(|w| w[0] == w[1])
}
