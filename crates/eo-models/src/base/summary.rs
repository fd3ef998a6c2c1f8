//! Model summary structures

use super::coefficient::Coefficient;
use super::statistics::ModelStatistics;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comprehensive model summary structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Model type
    pub model_type: ModelType,
    /// Dependent variable
    pub dependent: String,
    /// Covariance estimator used for the standard errors
    pub covariance: String,
    /// Number of observations
    pub n_obs: usize,
    /// Coefficients table
    pub coefficients: Vec<Coefficient>,
    /// Model statistics
    pub model_statistics: ModelStatistics,
    /// Free-form header lines (entities, periods, orders ...)
    pub details: Vec<(String, String)>,
}

impl ModelSummary {
    /// Start a summary with no details
    pub fn new(
        model_type: ModelType,
        dependent: impl Into<String>,
        covariance: impl Into<String>,
        n_obs: usize,
        coefficients: Vec<Coefficient>,
        model_statistics: ModelStatistics,
    ) -> Self {
        Self {
            model_type,
            dependent: dependent.into(),
            covariance: covariance.into(),
            n_obs,
            coefficients,
            model_statistics,
            details: Vec::new(),
        }
    }

    /// Add a `label: value` header line
    pub fn with_detail(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.details.push((label.into(), value.to_string()));
        self
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("{} Results", self.model_type);
        writeln!(f, "{}", title)?;
        writeln!(f, "{:=<78}", "")?;
        writeln!(f, "Dep. Variable: {}", self.dependent)?;
        writeln!(f, "Observations: {}", self.n_obs)?;
        writeln!(f, "Covariance Type: {}", self.covariance)?;
        for (label, value) in &self.details {
            writeln!(f, "{}: {}", label, value)?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:<16} {:>10} {:>10} {:>9} {:>9} {:>10} {:>10}",
            "Term", "Estimate", "Std Error", "t-value", "p-value", "[0.025", "0.975]"
        )?;
        writeln!(
            f,
            "{:-<16} {:-<10} {:-<10} {:-<9} {:-<9} {:-<10} {:-<10}",
            "", "", "", "", "", "", ""
        )?;

        for coeff in &self.coefficients {
            writeln!(
                f,
                "{:<16} {:>10.4} {:>10.4} {:>9.3} {:>9.3} {:>10.4} {:>10.4}",
                coeff.name,
                coeff.estimate,
                coeff.std_error.unwrap_or(f64::NAN),
                coeff.t_stat.unwrap_or(f64::NAN),
                coeff.p_value.unwrap_or(f64::NAN),
                coeff.ci_lower.unwrap_or(f64::NAN),
                coeff.ci_upper.unwrap_or(f64::NAN),
            )?;
        }
        writeln!(f)?;

        let stats = &self.model_statistics;
        let rows = [
            ("R-squared", stats.r_squared),
            ("Adjusted R-squared", stats.adj_r_squared),
            ("R-squared (Within)", stats.r_squared_within),
            ("R-squared (Between)", stats.r_squared_between),
            ("R-squared (Overall)", stats.r_squared_overall),
            ("F-statistic", stats.f_statistic),
            ("Prob (F-statistic)", stats.f_p_value),
            ("Log-likelihood", stats.log_likelihood),
            ("AIC", stats.aic),
            ("BIC", stats.bic),
            ("sigma2", stats.sigma2),
            ("Residual Std. Error", stats.residual_std_error),
        ];

        writeln!(f, "Model Statistics:")?;
        for (label, value) in rows {
            if let Some(value) = value {
                writeln!(f, "  {}: {:.4}", label, value)?;
            }
        }
        if let Some(df_resid) = stats.df_residual {
            writeln!(f, "  Residual DF: {}", df_resid)?;
        }
        if let Some(df_model) = stats.df_model {
            writeln!(f, "  Model DF: {}", df_model)?;
        }

        Ok(())
    }
}

/// Model type enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    /// Ordinary least squares
    Ols,
    /// ARIMA / SARIMA fitted by conditional sum of squares
    Arima,
    /// Pooled OLS on panel data
    PooledOls,
    /// Entity fixed effects
    FixedEffects,
    /// Swamy-Arora random effects
    RandomEffects,
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelType::Ols => write!(f, "OLS Regression"),
            ModelType::Arima => write!(f, "ARIMA (CSS)"),
            ModelType::PooledOls => write!(f, "PooledOLS Estimation"),
            ModelType::FixedEffects => write!(f, "PanelOLS Estimation"),
            ModelType::RandomEffects => write!(f, "RandomEffects Estimation"),
        }
    }
}

/// Anything that renders a human-readable results table
pub trait TextSummary {
    /// The text form of the summary
    fn summary_text(&self) -> String;
}

impl TextSummary for ModelSummary {
    fn summary_text(&self) -> String {
        self.to_string()
    }
}
