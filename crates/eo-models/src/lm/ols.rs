//! Ordinary Least Squares (OLS) linear regression
//!
//! This module implements the standard linear regression model
//! using the ordinary least squares estimator, with classical or
//! heteroskedasticity-consistent (HC1) coefficient covariance.

use ndarray::{Array1, Array2, Axis, s};
use tracing::debug;

use crate::base::{
    Coefficient, ModelError, ModelResultTrait, ModelStatistics, ModelSummary, ModelType,
    Reference, Result, TextSummary, coefficient_table, f_sf,
};
use crate::linalg;
use crate::lm::StandardErrorType;
use eo_core::data::DataFrame;
use eo_core::design::DesignMatrix;

// ==================== Type Definitions ====================

/// Matrix type alias for 2D arrays
pub type Matrix = Array2<f64>;

/// Vector type alias for 1D arrays
pub type Vector = Array1<f64>;

// ==================== Least Squares Core ====================

/// Bare least squares solution shared by the regression and the auxiliary
/// regressions inside the diagnostic tests
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Coefficients
    pub params: Vector,
    /// Fitted values
    pub fitted: Vector,
    /// Residuals
    pub residuals: Vector,
    /// (X'X)^-1
    pub xtx_inv: Matrix,
    /// Residual sum of squares
    pub ssr: f64,
    /// Total sum of squares around the mean
    pub centered_tss: f64,
    /// Total sum of squares around zero
    pub uncentered_tss: f64,
}

impl OlsFit {
    /// R-squared; centered when the regressors include a constant
    pub fn r_squared(&self, centered: bool) -> f64 {
        let tss = if centered {
            self.centered_tss
        } else {
            self.uncentered_tss
        };
        if tss > 0.0 { 1.0 - self.ssr / tss } else { f64::NAN }
    }
}

/// Fit `y` on `x` by least squares
pub fn ols(y: &Vector, x: &Matrix) -> Result<OlsFit> {
    let (n, k) = x.dim();

    if y.len() != n {
        return Err(ModelError::InvalidConfig {
            message: format!("response has {} rows, design has {}", y.len(), n),
        });
    }
    if n < k || k == 0 {
        return Err(ModelError::InsufficientData {
            n_samples: n,
            n_predictors: k,
        });
    }

    let params = linalg::lstsq(x, y, "ols")?;
    let xtx_inv = linalg::inv(&linalg::gram(x), "ols")?;
    let fitted = x.dot(&params);
    let residuals = y - &fitted;

    let mean = y.mean().unwrap_or(0.0);
    let ssr = residuals.dot(&residuals);
    let centered_tss = y.iter().map(|&v| (v - mean).powi(2)).sum();
    let uncentered_tss = y.dot(y);

    Ok(OlsFit {
        params,
        fitted,
        residuals,
        xtx_inv,
        ssr,
        centered_tss,
        uncentered_tss,
    })
}

/// Gaussian log-likelihood at the ML variance `ssr / n`
pub fn loglike(ssr: f64, nobs: usize) -> f64 {
    let n = nobs as f64;
    -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (ssr / n).ln() + 1.0)
}

/// White sandwich `(X'X)^-1 X' diag(e^2) X (X'X)^-1`, unscaled
pub fn white_covariance(x: &Matrix, residuals: &Vector, xtx_inv: &Matrix) -> Matrix {
    let scores = x * &residuals.view().insert_axis(Axis(1));
    let meat = scores.t().dot(&scores);
    xtx_inv.dot(&meat).dot(xtx_inv)
}

/// Whether the first column of `x` is a column of ones
pub fn has_constant(x: &Matrix) -> bool {
    x.ncols() > 0 && x.column(0).iter().all(|&v| v == 1.0)
}

/// Wald F-test that every coefficient except the intercept is zero
pub fn wald_f(params: &Vector, cov: &Matrix, skip_first: bool) -> Result<(f64, usize)> {
    let start = usize::from(skip_first);
    let q = params.len().saturating_sub(start);
    if q == 0 {
        return Ok((f64::NAN, 0));
    }

    let b = params.slice(s![start..]).to_owned();
    let v = cov.slice(s![start.., start..]).to_owned();
    let v_inv = linalg::inv(&v, "wald_f")?;
    Ok((b.dot(&v_inv.dot(&b)) / q as f64, q))
}

// ==================== Linear Regression Result ====================

/// OLS linear regression result
#[derive(Debug, Clone)]
pub struct LinearRegressionResult {
    /// Dependent variable name
    pub dependent: String,
    /// Coefficient estimates
    pub params: Vector,
    /// Coefficient covariance matrix
    pub covariance: Matrix,
    /// Coefficient table
    pub coefficients: Vec<Coefficient>,
    /// Fitted values
    pub fitted_values: Vector,
    /// Residuals
    pub residuals: Vector,
    /// Design matrix
    pub x: Matrix,
    /// Response vector
    pub y: Vector,
    /// Variable names
    pub variable_names: Vec<String>,
    /// Standard error type used
    pub se_type: StandardErrorType,
    /// Model statistics
    pub model_statistics: ModelStatistics,
}

impl LinearRegressionResult {
    /// Coefficient estimate by name
    pub fn param(&self, name: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.estimate)
    }

    /// Number of observations
    pub fn nobs(&self) -> usize {
        self.y.len()
    }
}

impl ModelResultTrait for LinearRegressionResult {
    fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    fn residuals(&self) -> &Vector {
        &self.residuals
    }

    fn statistics(&self) -> &ModelStatistics {
        &self.model_statistics
    }

    fn summary(&self) -> ModelSummary {
        ModelSummary::new(
            ModelType::Ols,
            self.dependent.clone(),
            self.se_type.to_string(),
            self.nobs(),
            self.coefficients.clone(),
            self.model_statistics,
        )
    }
}

impl TextSummary for LinearRegressionResult {
    fn summary_text(&self) -> String {
        self.summary().to_string()
    }
}

// ==================== Linear Regression Model ====================

/// OLS linear regression model
#[derive(Debug, Clone)]
pub struct LinearRegression {
    /// Response and regressors
    design: DesignMatrix,
    /// Standard error type
    se_type: StandardErrorType,
}

impl LinearRegression {
    /// Create a new linear regression model on a prepared design
    pub fn new(design: DesignMatrix) -> Self {
        Self {
            design,
            se_type: StandardErrorType::Standard,
        }
    }

    /// `response ~ const + regressors` taken from a frame
    pub fn from_frame<S: AsRef<str>>(
        data: &DataFrame,
        response: &str,
        regressors: &[S],
    ) -> Result<Self> {
        Ok(Self::new(DesignMatrix::build(data, response, regressors, true)?))
    }

    /// Use robust standard errors
    pub fn robust(mut self, se_type: StandardErrorType) -> Self {
        self.se_type = se_type;
        self
    }

    /// The design this model is fitted on
    pub fn design(&self) -> &DesignMatrix {
        &self.design
    }

    /// Fit the OLS model
    pub fn fit(&self) -> Result<LinearRegressionResult> {
        let x = &self.design.x;
        let y = &self.design.y;
        let (n, k) = x.dim();

        if n <= k {
            return Err(ModelError::InsufficientData {
                n_samples: n,
                n_predictors: k,
            });
        }

        let fit = ols(y, x)?;
        let with_const = has_constant(x);
        let k_const = usize::from(with_const);
        let df_resid = (n - k) as f64;

        let r_squared = fit.r_squared(with_const);
        let adj_r_squared = 1.0 - (1.0 - r_squared) * (n - k_const) as f64 / df_resid;
        let sigma2 = fit.ssr / df_resid;

        let (covariance, reference) = match self.se_type {
            StandardErrorType::Standard => (&fit.xtx_inv * sigma2, Reference::StudentT(df_resid)),
            StandardErrorType::HC1 => {
                let white = white_covariance(x, &fit.residuals, &fit.xtx_inv);
                (white * (n as f64 / df_resid), Reference::Normal)
            }
        };

        let coefficients =
            coefficient_table(&self.design.names, &fit.params, &covariance, reference)?;

        // A perfect fit leaves a zero covariance and no usable F-test
        let (f_statistic, q) = wald_f(&fit.params, &covariance, with_const)
            .unwrap_or((f64::NAN, k - k_const));
        let f_p_value = if q > 0 {
            Some(f_sf(f_statistic, q as f64, df_resid)?)
        } else {
            None
        };

        let nf = n as f64;
        let log_likelihood = loglike(fit.ssr, n);
        let aic = -2.0 * log_likelihood + 2.0 * k as f64;
        let bic = -2.0 * log_likelihood + nf.ln() * k as f64;

        debug!(
            n_obs = n,
            n_params = k,
            r_squared,
            se_type = %self.se_type,
            "fitted OLS"
        );

        let model_statistics = ModelStatistics {
            r_squared: Some(r_squared),
            adj_r_squared: Some(adj_r_squared),
            residual_std_error: Some(sigma2.sqrt()),
            f_statistic: (q > 0).then_some(f_statistic),
            f_p_value,
            log_likelihood: Some(log_likelihood),
            aic: Some(aic),
            bic: Some(bic),
            df_residual: Some(n - k),
            df_model: Some(k - k_const),
            ..ModelStatistics::default()
        };

        Ok(LinearRegressionResult {
            dependent: self.design.response.clone(),
            params: fit.params,
            covariance,
            coefficients,
            fitted_values: fit.fitted,
            residuals: fit.residuals,
            x: x.clone(),
            y: y.clone(),
            variable_names: self.design.names.clone(),
            se_type: self.se_type,
            model_statistics,
        })
    }
}
