//! Coefficient definition

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::base::Result;
use crate::error::ModelError;

/// Coefficient estimate with statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    /// Coefficient name
    pub name: String,
    /// Coefficient estimate
    pub estimate: f64,
    /// Standard error
    pub std_error: Option<f64>,
    /// t- or z-statistic
    pub t_stat: Option<f64>,
    /// p-value
    pub p_value: Option<f64>,
    /// Lower bound of confidence interval
    pub ci_lower: Option<f64>,
    /// Upper bound of confidence interval
    pub ci_upper: Option<f64>,
}

impl Coefficient {
    /// Create a new coefficient
    pub fn new(name: impl Into<String>, estimate: f64) -> Self {
        Self {
            name: name.into(),
            estimate,
            std_error: None,
            t_stat: None,
            p_value: None,
            ci_lower: None,
            ci_upper: None,
        }
    }

    /// Set standard error
    pub fn with_std_error(mut self, se: f64) -> Self {
        self.std_error = Some(se);
        self
    }

    /// Set t-statistic
    pub fn with_t_stat(mut self, t: f64) -> Self {
        self.t_stat = Some(t);
        self
    }

    /// Set p-value
    pub fn with_p_value(mut self, p: f64) -> Self {
        self.p_value = Some(p);
        self
    }

    /// Set confidence interval
    pub fn with_ci(mut self, lower: f64, upper: f64) -> Self {
        self.ci_lower = Some(lower);
        self.ci_upper = Some(upper);
        self
    }
}

/// Reference distribution for coefficient tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reference {
    /// Student t with the given residual degrees of freedom
    StudentT(f64),
    /// Standard normal (asymptotic covariance estimators)
    Normal,
}

impl Reference {
    /// Two-sided p-value of `stat` and the 97.5% critical value
    fn two_sided(self) -> Result<(impl Fn(f64) -> f64, f64)> {
        let (df, name) = match self {
            Reference::StudentT(df) => (df, "t distribution"),
            Reference::Normal => (f64::INFINITY, "normal distribution"),
        };

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ModelError::numerical(e.to_string(), name))?;
        let t = if df.is_finite() {
            Some(
                StudentsT::new(0.0, 1.0, df)
                    .map_err(|e| ModelError::numerical(e.to_string(), name))?,
            )
        } else {
            None
        };

        let crit = match &t {
            Some(dist) => dist.inverse_cdf(0.975),
            None => normal.inverse_cdf(0.975),
        };
        let p_value = move |stat: f64| match &t {
            _ if stat.is_nan() => f64::NAN,
            Some(dist) => 2.0 * dist.sf(stat.abs()),
            None => 2.0 * normal.sf(stat.abs()),
        };

        Ok((p_value, crit))
    }
}

/// Build the coefficient table from estimates and their covariance matrix
pub fn coefficient_table(
    names: &[String],
    params: &Array1<f64>,
    cov: &Array2<f64>,
    reference: Reference,
) -> Result<Vec<Coefficient>> {
    if names.len() != params.len() || cov.nrows() != params.len() {
        return Err(ModelError::InvalidConfig {
            message: format!(
                "{} names for {} parameters and a {}x{} covariance",
                names.len(),
                params.len(),
                cov.nrows(),
                cov.ncols()
            ),
        });
    }

    let (p_value, crit) = reference.two_sided()?;

    Ok(names
        .iter()
        .zip(params.iter())
        .enumerate()
        .map(|(i, (name, &estimate))| {
            let se = cov[[i, i]].max(0.0).sqrt();
            let t = estimate / se;
            Coefficient::new(name.clone(), estimate)
                .with_std_error(se)
                .with_t_stat(t)
                .with_p_value(p_value(t).clamp(0.0, 1.0))
                .with_ci(estimate - crit * se, estimate + crit * se)
        })
        .collect())
}
