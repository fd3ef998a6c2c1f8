//! Core traits and types for statistical models
//!
//! This module defines the shared result structures every estimator in
//! EconOxide reports through, plus the reference distributions used to turn
//! test statistics into p-values.

use ndarray::Array1;
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal};

// Re-export core types
pub use coefficient::{Coefficient, Reference, coefficient_table};
pub use statistics::ModelStatistics;
pub use summary::{ModelSummary, ModelType, TextSummary};

pub use crate::error::ModelError;

pub mod coefficient;
pub mod statistics;
pub mod summary;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Trait for fitted model results
pub trait ModelResultTrait {
    /// Coefficient table in regressor order
    fn coefficients(&self) -> &[Coefficient];

    /// Residuals of the fit
    fn residuals(&self) -> &Array1<f64>;

    /// Goodness of fit and information criteria
    fn statistics(&self) -> &ModelStatistics;

    /// Generate model summary
    fn summary(&self) -> ModelSummary;
}

/// Upper tail of the chi-squared distribution
pub fn chi2_sf(stat: f64, df: f64) -> Result<f64> {
    if stat.is_nan() {
        return Ok(f64::NAN);
    }
    let dist = ChiSquared::new(df)
        .map_err(|e| ModelError::numerical(e.to_string(), "chi-squared distribution"))?;
    Ok(dist.sf(stat))
}

/// Upper tail of the F distribution
pub fn f_sf(stat: f64, df1: f64, df2: f64) -> Result<f64> {
    if stat.is_nan() {
        return Ok(f64::NAN);
    }
    let dist = FisherSnedecor::new(df1, df2)
        .map_err(|e| ModelError::numerical(e.to_string(), "F distribution"))?;
    Ok(dist.sf(stat))
}

/// Two-sided standard normal p-value
pub fn normal_two_sided(z: f64) -> Result<f64> {
    let dist = Normal::new(0.0, 1.0)
        .map_err(|e| ModelError::numerical(e.to_string(), "normal distribution"))?;
    Ok((2.0 * dist.sf(z.abs())).min(1.0))
}

/// Standard normal CDF
pub fn normal_cdf(z: f64) -> Result<f64> {
    let dist = Normal::new(0.0, 1.0)
        .map_err(|e| ModelError::numerical(e.to_string(), "normal distribution"))?;
    Ok(dist.cdf(z))
}
