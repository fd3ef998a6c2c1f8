//! Linear regression models
//!
//! Ordinary least squares with classical or HC1 standard errors, and the
//! residual diagnostics run against a fitted regression:
//! - Variance inflation factors
//! - Breusch-Pagan heteroskedasticity test
//! - Durbin-Watson statistic
//! - Jarque-Bera normality test

pub mod diagnostics;
pub mod ols;


// Re-exports
pub use diagnostics::{BreuschPagan, Diagnostics, DurbinWatson, JarqueBera, VIF};
pub use ols::{LinearRegression, LinearRegressionResult, OlsFit, ols};

use std::fmt;

use crate::base::Result;
use eo_core::data::DataFrame;
use serde::{Deserialize, Serialize};

/// Standard error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StandardErrorType {
    /// Standard errors assuming homoscedasticity
    #[default]
    Standard,
    /// Heteroscedasticity-consistent standard errors, small-sample scaled
    HC1,
}

impl fmt::Display for StandardErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandardErrorType::Standard => write!(f, "nonrobust"),
            StandardErrorType::HC1 => write!(f, "HC1"),
        }
    }
}

/// Convenience function for OLS regression with an intercept
pub fn lm<S: AsRef<str>>(
    data: &DataFrame,
    response: &str,
    regressors: &[S],
) -> Result<LinearRegressionResult> {
    LinearRegression::from_frame(data, response, regressors)?.fit()
}
