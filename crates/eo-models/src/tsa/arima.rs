//! ARIMA and seasonal ARIMA by conditional sum of squares
//!
//! The series is differenced by `(1-B)^d (1-B^m)^D`, then the ARMA part
//! `phi(B) Phi(B^m) (w_t - mu) = theta(B) Theta(B^m) e_t` is fitted by
//! minimising the sum of squared one-step errors, conditioning on the
//! first observations. Parameters outside the stationary / invertible
//! region are rejected.

use std::fmt;

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::neldermead::NelderMead;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::base::{
    Coefficient, ModelError, ModelResultTrait, ModelStatistics, ModelSummary, ModelType,
    Reference, Result, TextSummary, coefficient_table,
};
use crate::linalg;
use crate::tsa::{diff, seasonal_diff};

/// Non-seasonal order `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[usize; 3]", into = "[usize; 3]")]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl From<[usize; 3]> for ArimaOrder {
    fn from([p, d, q]: [usize; 3]) -> Self {
        Self { p, d, q }
    }
}

impl From<ArimaOrder> for [usize; 3] {
    fn from(o: ArimaOrder) -> Self {
        [o.p, o.d, o.q]
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}

/// Seasonal order `(P, D, Q, m)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[usize; 4]", into = "[usize; 4]")]
pub struct SeasonalOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub m: usize,
}

impl SeasonalOrder {
    pub fn new(p: usize, d: usize, q: usize, m: usize) -> Self {
        Self { p, d, q, m }
    }

    /// No seasonal component
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether a seasonal period is in use
    pub fn is_seasonal(&self) -> bool {
        self.m > 1
    }
}

impl From<[usize; 4]> for SeasonalOrder {
    fn from([p, d, q, m]: [usize; 4]) -> Self {
        Self { p, d, q, m }
    }
}

impl From<SeasonalOrder> for [usize; 4] {
    fn from(o: SeasonalOrder) -> Self {
        [o.p, o.d, o.q, o.m]
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.p, self.d, self.q, self.m)
    }
}

/// Roots of `1 - a_1 z - ... - a_k z^k` all lie outside the unit circle
///
/// Levinson-Durbin step-down: every reflection coefficient must be
/// strictly inside (-1, 1).
pub fn is_stationary(coefs: &[f64]) -> bool {
    let mut a = coefs.to_vec();
    while let Some(&r) = a.last() {
        if !r.is_finite() || r.abs() >= 1.0 {
            return false;
        }
        let k = a.len();
        let denom = 1.0 - r * r;
        a = (0..k - 1)
            .map(|i| (a[i] + r * a[k - 2 - i]) / denom)
            .collect();
    }
    true
}

/// Roots of `1 + b_1 z + ... + b_k z^k` all lie outside the unit circle
pub fn is_invertible(coefs: &[f64]) -> bool {
    let negated: Vec<f64> = coefs.iter().map(|b| -b).collect();
    is_stationary(&negated)
}

/// Coefficients `c_1..` of `(1 + s a(B)) (1 + s A(B^m))` without the leading one
fn expand(short: &[f64], seasonal: &[f64], m: usize, sign: f64) -> Vec<f64> {
    let len = short.len() + m * seasonal.len();
    let mut lhs = vec![0.0; short.len() + 1];
    lhs[0] = 1.0;
    for (i, &c) in short.iter().enumerate() {
        lhs[i + 1] = sign * c;
    }
    let mut rhs = vec![0.0; m * seasonal.len() + 1];
    rhs[0] = 1.0;
    for (j, &c) in seasonal.iter().enumerate() {
        rhs[m * (j + 1)] = sign * c;
    }

    let mut out = vec![0.0; len + 1];
    for (i, &a) in lhs.iter().enumerate() {
        for (j, &b) in rhs.iter().enumerate() {
            out[i + j] += a * b;
        }
    }
    out.into_iter().skip(1).map(|c| sign * c).collect()
}

/// Parameter vector layout
#[derive(Debug, Clone, Copy)]
struct Layout {
    intercept: bool,
    p: usize,
    q: usize,
    sp: usize,
    sq: usize,
    m: usize,
}

impl Layout {
    fn len(&self) -> usize {
        usize::from(self.intercept) + self.p + self.q + self.sp + self.sq
    }

    fn names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.len() + 1);
        if self.intercept {
            names.push("intercept".to_string());
        }
        names.extend((1..=self.p).map(|i| format!("ar.L{}", i)));
        names.extend((1..=self.q).map(|i| format!("ma.L{}", i)));
        names.extend((1..=self.sp).map(|i| format!("ar.S.L{}", i * self.m)));
        names.extend((1..=self.sq).map(|i| format!("ma.S.L{}", i * self.m)));
        names
    }

    /// `(mu, ar, ma, seasonal ar, seasonal ma)` views of a parameter vector
    fn split<'a>(&self, params: &'a [f64]) -> (f64, &'a [f64], &'a [f64], &'a [f64], &'a [f64]) {
        let mut at = 0;
        let mu = if self.intercept {
            at = 1;
            params[0]
        } else {
            0.0
        };
        let ar = &params[at..at + self.p];
        at += self.p;
        let ma = &params[at..at + self.q];
        at += self.q;
        let sar = &params[at..at + self.sp];
        at += self.sp;
        let sma = &params[at..at + self.sq];
        (mu, ar, ma, sar, sma)
    }

    fn admissible(&self, params: &[f64]) -> bool {
        let (_, ar, ma, sar, sma) = self.split(params);
        is_stationary(ar) && is_stationary(sar) && is_invertible(ma) && is_invertible(sma)
    }
}

/// Conditional residuals of the differenced series from index `t0` on
fn css_residuals(w: &[f64], layout: &Layout, params: &[f64], t0: usize) -> Vec<f64> {
    let (mu, ar, ma, sar, sma) = layout.split(params);
    let phi = expand(ar, sar, layout.m, -1.0);
    let theta = expand(ma, sma, layout.m, 1.0);

    let mut e = vec![0.0; w.len()];
    for t in t0..w.len() {
        let mut value = w[t] - mu;
        for (k, &a) in phi.iter().enumerate() {
            value -= a * (w[t - k - 1] - mu);
        }
        for (k, &b) in theta.iter().enumerate() {
            if t >= t0 + k + 1 {
                value -= b * e[t - k - 1];
            }
        }
        e[t] = value;
    }
    e.split_off(t0)
}

/// Sum of squares objective handed to the optimizer
struct CssProblem<'a> {
    w: &'a [f64],
    layout: Layout,
    t0: usize,
    penalty: f64,
}

impl CostFunction for CssProblem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        if !self.layout.admissible(params) {
            return Ok(self.penalty);
        }
        let ssr: f64 = css_residuals(self.w, &self.layout, params, self.t0)
            .iter()
            .map(|e| e * e)
            .sum();
        Ok(if ssr.is_finite() { ssr } else { self.penalty })
    }
}

// ==================== ARIMA Result ====================

/// Fitted ARIMA model
#[derive(Debug, Clone)]
pub struct ArimaResult {
    /// Name of the modelled series
    pub dependent: String,
    pub order: ArimaOrder,
    pub seasonal_order: SeasonalOrder,
    pub intercept: bool,
    /// Parameter names, `sigma2` last
    pub names: Vec<String>,
    /// Estimates in `names` order, `sigma2` last
    pub params: Array1<f64>,
    /// Covariance of `params`
    pub covariance: Array2<f64>,
    pub coefficients: Vec<Coefficient>,
    /// One-step residuals of the conditioned sample
    pub residuals: Array1<f64>,
    pub sigma2: f64,
    /// Length of the undifferenced input
    pub n_obs: usize,
    /// Observations entering the sum of squares
    pub n_eff: usize,
    /// Whether the optimizer met its tolerance
    pub converged: bool,
    pub model_statistics: ModelStatistics,
}

impl ArimaResult {
    pub fn aic(&self) -> f64 {
        self.model_statistics.aic.unwrap_or(f64::NAN)
    }

    pub fn bic(&self) -> f64 {
        self.model_statistics.bic.unwrap_or(f64::NAN)
    }

    /// `ARIMA(p, d, q)` or `SARIMA(p, d, q)(P, D, Q, m)`
    pub fn label(&self) -> String {
        if self.seasonal_order.is_seasonal() {
            format!("SARIMA{}{}", self.order, self.seasonal_order)
        } else {
            format!("ARIMA{}", self.order)
        }
    }
}

impl ModelResultTrait for ArimaResult {
    fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    fn residuals(&self) -> &Array1<f64> {
        &self.residuals
    }

    fn statistics(&self) -> &ModelStatistics {
        &self.model_statistics
    }

    fn summary(&self) -> ModelSummary {
        ModelSummary::new(
            ModelType::Arima,
            self.dependent.clone(),
            "approx (Gauss-Newton)",
            self.n_obs,
            self.coefficients.clone(),
            self.model_statistics,
        )
        .with_detail("Model", self.label())
        .with_detail("Method", "css")
        .with_detail("Effective Observations", self.n_eff)
    }
}

impl TextSummary for ArimaResult {
    fn summary_text(&self) -> String {
        self.summary().to_string()
    }
}

// ==================== ARIMA Model ====================

/// ARIMA model specification
#[derive(Debug, Clone)]
pub struct Arima {
    order: ArimaOrder,
    seasonal: SeasonalOrder,
    intercept: bool,
    condition_on: Option<usize>,
    max_iters: u64,
    dependent: String,
}

impl Arima {
    /// Create a non-seasonal model with no intercept
    pub fn new(order: ArimaOrder) -> Self {
        Self {
            order,
            seasonal: SeasonalOrder::none(),
            intercept: false,
            condition_on: None,
            max_iters: 2000,
            dependent: "y".to_string(),
        }
    }

    /// Name reported for the series in summaries
    pub fn dependent(mut self, name: impl Into<String>) -> Self {
        self.dependent = name.into();
        self
    }

    /// Add a seasonal component
    pub fn seasonal(mut self, seasonal: SeasonalOrder) -> Self {
        self.seasonal = seasonal;
        self
    }

    /// Estimate a mean for the differenced series
    pub fn with_intercept(mut self, intercept: bool) -> Self {
        self.intercept = intercept;
        self
    }

    /// Condition on the first `n` differenced observations instead of the
    /// AR order, so models of different order share one sample
    pub fn condition_on(mut self, n: usize) -> Self {
        self.condition_on = Some(n);
        self
    }

    /// Iteration cap for the simplex search
    pub fn max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    fn layout(&self) -> Layout {
        let m = if self.seasonal.is_seasonal() {
            self.seasonal.m
        } else {
            1
        };
        let seasonal = self.seasonal.is_seasonal();
        Layout {
            intercept: self.intercept,
            p: self.order.p,
            q: self.order.q,
            sp: if seasonal { self.seasonal.p } else { 0 },
            sq: if seasonal { self.seasonal.q } else { 0 },
            m,
        }
    }

    /// Fit the model
    pub fn fit(&self, y: &Array1<f64>) -> Result<ArimaResult> {
        let raw = y.to_vec();
        if raw.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidConfig {
                message: "series contains missing or infinite values".to_string(),
            });
        }

        let layout = self.layout();
        let mut w = diff(&raw, self.order.d);
        if self.seasonal.is_seasonal() {
            w = seasonal_diff(&w, self.seasonal.m, self.seasonal.d);
        }

        let ar_order = layout.p + layout.m * layout.sp;
        let t0 = self.condition_on.unwrap_or(0).max(ar_order);
        let k = layout.len();

        if w.len() < t0 + k + 2 {
            return Err(ModelError::InsufficientData {
                n_samples: w.len().saturating_sub(t0),
                n_predictors: k + 1,
            });
        }

        let (params, converged) = self.estimate(&w, &layout, t0)?;

        if !layout.admissible(&params) {
            return Err(ModelError::NotConverged {
                message: "non-stationary AR or non-invertible MA parameters".to_string(),
            });
        }

        let residuals = css_residuals(&w, &layout, &params, t0);
        let n_eff = residuals.len();
        let ssr: f64 = residuals.iter().map(|e| e * e).sum();
        let sigma2 = ssr / n_eff as f64;

        let n = n_eff as f64;
        let log_likelihood = -0.5 * n * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
        let n_params = (k + 1) as f64;
        let aic = -2.0 * log_likelihood + 2.0 * n_params;
        let bic = -2.0 * log_likelihood + n.ln() * n_params;

        let mut names = layout.names();
        names.push("sigma2".to_string());
        let mut all_params = params.clone();
        all_params.push(sigma2);
        let all_params = Array1::from(all_params);

        let cov = self.covariance(&w, &layout, &params, t0, sigma2, n_eff);
        let coefficients = coefficient_table(&names, &all_params, &cov, Reference::Normal)?;

        debug!(
            order = %self.order,
            seasonal = %self.seasonal,
            intercept = self.intercept,
            aic,
            converged,
            "fitted ARIMA"
        );

        Ok(ArimaResult {
            dependent: self.dependent.clone(),
            order: self.order,
            seasonal_order: self.seasonal,
            intercept: self.intercept,
            names,
            params: all_params,
            covariance: cov,
            coefficients,
            residuals: Array1::from(residuals),
            sigma2,
            n_obs: raw.len(),
            n_eff,
            converged,
            model_statistics: ModelStatistics {
                log_likelihood: Some(log_likelihood),
                aic: Some(aic),
                bic: Some(bic),
                sigma2: Some(sigma2),
                df_model: Some(k),
                df_residual: Some(n_eff.saturating_sub(k)),
                ..ModelStatistics::default()
            },
        })
    }

    /// Nelder-Mead over the ARMA parameters, starting from white noise
    fn estimate(&self, w: &[f64], layout: &Layout, t0: usize) -> Result<(Vec<f64>, bool)> {
        let k = layout.len();
        let mean = w.iter().sum::<f64>() / w.len() as f64;

        let mut start = vec![0.0; k];
        if layout.intercept {
            start[0] = mean;
        }
        if k == 0 {
            return Ok((start, true));
        }

        let spread = (w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / w.len() as f64).sqrt();
        let mut simplex = vec![start.clone()];
        for i in 0..k {
            let mut vertex = start.clone();
            vertex[i] += if layout.intercept && i == 0 {
                0.1 * spread.max(1e-8)
            } else {
                0.1
            };
            simplex.push(vertex);
        }

        let scale: f64 = w.iter().map(|v| v * v).sum::<f64>() + 1.0;
        let problem = CssProblem {
            w,
            layout: *layout,
            t0,
            penalty: 1e6 * scale,
        };

        let solver = NelderMead::<Vec<f64>, f64>::new(simplex)
            .with_sd_tolerance(1e-10)
            .map_err(|e| ModelError::numerical(e.to_string(), "arima"))?;
        let result = Executor::new(problem, solver)
            .configure(|state| state.max_iters(self.max_iters))
            .run()
            .map_err(|e| ModelError::NotConverged {
                message: e.to_string(),
            })?;

        let state = result.state();
        let converged = state.get_iter() < self.max_iters;
        let best = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| ModelError::NotConverged {
                message: "optimizer returned no parameters".to_string(),
            })?;

        Ok((best, converged))
    }

    /// Gauss-Newton covariance `sigma2 (J'J)^-1` of the ARMA parameters,
    /// with `2 sigma2^2 / n` for `sigma2` itself
    fn covariance(
        &self,
        w: &[f64],
        layout: &Layout,
        params: &[f64],
        t0: usize,
        sigma2: f64,
        n_eff: usize,
    ) -> Array2<f64> {
        let k = params.len();
        let mut cov = Array2::<f64>::from_elem((k + 1, k + 1), 0.0);
        cov[[k, k]] = 2.0 * sigma2 * sigma2 / n_eff as f64;
        if k == 0 {
            return cov;
        }

        let mut jac = Array2::<f64>::zeros((n_eff, k));
        for j in 0..k {
            let h = 1e-5 * params[j].abs().max(1.0);
            let mut up = params.to_vec();
            let mut down = params.to_vec();
            up[j] += h;
            down[j] -= h;
            let e_up = css_residuals(w, layout, &up, t0);
            let e_down = css_residuals(w, layout, &down, t0);
            for t in 0..n_eff {
                jac[[t, j]] = (e_up[t] - e_down[t]) / (2.0 * h);
            }
        }

        match linalg::inv(&linalg::gram(&jac), "arima covariance") {
            Ok(inv) => {
                for i in 0..k {
                    for j in 0..k {
                        cov[[i, j]] = sigma2 * inv[[i, j]];
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "ARIMA parameter covariance unavailable");
                for i in 0..k {
                    cov[[i, i]] = f64::NAN;
                }
            }
        }
        cov
    }
}
