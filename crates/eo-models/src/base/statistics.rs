//! Statistical structures for model results

use serde::{Deserialize, Serialize};

/// Model statistics
///
/// Every estimator fills the fields that make sense for it and leaves the
/// rest as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelStatistics {
    /// R-squared
    pub r_squared: Option<f64>,
    /// Adjusted R-squared
    pub adj_r_squared: Option<f64>,
    /// Within R-squared (panel)
    pub r_squared_within: Option<f64>,
    /// Between R-squared (panel)
    pub r_squared_between: Option<f64>,
    /// Overall R-squared (panel)
    pub r_squared_overall: Option<f64>,
    /// Residual standard error
    pub residual_std_error: Option<f64>,
    /// F-statistic
    pub f_statistic: Option<f64>,
    /// F-statistic p-value
    pub f_p_value: Option<f64>,
    /// Log-likelihood
    pub log_likelihood: Option<f64>,
    /// AIC
    pub aic: Option<f64>,
    /// BIC
    pub bic: Option<f64>,
    /// Innovation variance (ARIMA)
    pub sigma2: Option<f64>,
    /// Residual degrees of freedom
    pub df_residual: Option<usize>,
    /// Model degrees of freedom
    pub df_model: Option<usize>,
}
