//! Automatic ARIMA order selection
//!
//! Differencing orders come first: the seasonal order from the strength
//! of a classical seasonal decomposition, the regular order from repeated
//! ADF tests. The ARMA orders are then searched either stepwise (walk to
//! the best neighbouring order until nothing improves) or over the full
//! grid, comparing candidates by AIC or BIC on a shared sample.

use std::collections::HashSet;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::base::{ModelError, Result};
use crate::tsa::adf::adfuller;
use crate::tsa::arima::{Arima, ArimaOrder, ArimaResult, SeasonalOrder};
use crate::tsa::{diff, is_constant, seasonal_diff};

/// Seasonal strength above which one seasonal difference is taken
const SEASONAL_STRENGTH_THRESHOLD: f64 = 0.64;

/// Criterion used to rank candidate models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    #[default]
    Aic,
    Bic,
}

impl InformationCriterion {
    fn of(&self, fit: &ArimaResult) -> f64 {
        match self {
            InformationCriterion::Aic => fit.aic(),
            InformationCriterion::Bic => fit.bic(),
        }
    }
}

/// Search bounds and switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoArimaConfig {
    pub start_p: usize,
    pub start_q: usize,
    pub max_p: usize,
    pub max_q: usize,
    pub start_seasonal_p: usize,
    pub start_seasonal_q: usize,
    pub max_seasonal_p: usize,
    pub max_seasonal_q: usize,
    pub max_d: usize,
    pub max_seasonal_d: usize,
    /// Bound on `p + q + P + Q`
    pub max_order: usize,
    pub stepwise: bool,
    /// Bound on stepwise moves
    pub max_steps: usize,
    pub information_criterion: InformationCriterion,
    /// Significance level of the ADF tests choosing `d`
    pub alpha: f64,
}

impl Default for AutoArimaConfig {
    fn default() -> Self {
        Self {
            start_p: 1,
            start_q: 1,
            max_p: 3,
            max_q: 3,
            start_seasonal_p: 0,
            start_seasonal_q: 1,
            max_seasonal_p: 2,
            max_seasonal_q: 2,
            max_d: 2,
            max_seasonal_d: 1,
            max_order: 5,
            stepwise: true,
            max_steps: 100,
            information_criterion: InformationCriterion::Aic,
            alpha: 0.05,
        }
    }
}

/// Selected model and search bookkeeping
#[derive(Debug, Clone)]
pub struct AutoArimaResult {
    pub model: ArimaResult,
    pub order: ArimaOrder,
    pub seasonal_order: SeasonalOrder,
    /// Candidate fits attempted, failed ones included
    pub models_evaluated: usize,
}

/// `(p, q, P, Q)` of one candidate
type Orders = (usize, usize, usize, usize);

/// Automatic order selection for a seasonal period `m` (`m <= 1` for none)
#[derive(Debug, Clone)]
pub struct AutoArima {
    config: AutoArimaConfig,
    m: usize,
    dependent: String,
}

impl AutoArima {
    pub fn new(config: AutoArimaConfig) -> Self {
        Self {
            config,
            m: 1,
            dependent: "y".to_string(),
        }
    }

    /// Name reported for the series in the selected model's summary
    pub fn dependent(mut self, name: impl Into<String>) -> Self {
        self.dependent = name.into();
        self
    }

    /// Search seasonal orders with period `m`
    pub fn seasonal_period(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    pub fn config(&self) -> &AutoArimaConfig {
        &self.config
    }

    /// Pick differencing and ARMA orders for `y` and fit the winner
    pub fn fit(&self, y: &Array1<f64>) -> Result<AutoArimaResult> {
        let cfg = &self.config;
        let raw = y.to_vec();
        let seasonal = self.m > 1;

        let big_d = if seasonal {
            nsdiffs(&raw, self.m, cfg.max_seasonal_d)
        } else {
            0
        };
        let deseasoned = if seasonal {
            seasonal_diff(&raw, self.m, big_d)
        } else {
            raw.clone()
        };
        let d = ndiffs(&deseasoned, cfg.alpha, cfg.max_d);
        let w_len = diff(&deseasoned, d).len();
        let intercept = d + big_d == 0;

        // Seasonal AR lags must leave most of the sample for estimation
        let (max_sp, max_sq) = if seasonal {
            let cap = (w_len / 3).saturating_sub(1) / self.m;
            (cfg.max_seasonal_p.min(cap), cfg.max_seasonal_q.min(cap))
        } else {
            (0, 0)
        };
        let period = if seasonal { self.m } else { 1 };
        let condition_on = cfg.max_p + period * max_sp;

        debug!(d, seasonal_d = big_d, intercept, m = self.m, "differencing orders chosen");

        let mut search = Search {
            y,
            d,
            big_d,
            m: self.m,
            intercept,
            condition_on,
            criterion: cfg.information_criterion,
            tried: HashSet::new(),
            attempts: 0,
            best: None,
        };

        let within = |o: &Orders| {
            o.0 <= cfg.max_p
                && o.1 <= cfg.max_q
                && o.2 <= max_sp
                && o.3 <= max_sq
                && o.0 + o.1 + o.2 + o.3 <= cfg.max_order
        };

        if cfg.stepwise {
            let clamp_seasonal = |v: usize, max: usize| if seasonal { v.min(max) } else { 0 };
            let mut starts = vec![(
                cfg.start_p.min(cfg.max_p),
                cfg.start_q.min(cfg.max_q),
                clamp_seasonal(cfg.start_seasonal_p, max_sp),
                clamp_seasonal(cfg.start_seasonal_q, max_sq),
            )];
            starts.push((0, 0, 0, 0));
            if cfg.max_p > 0 || max_sp > 0 {
                starts.push((usize::from(cfg.max_p > 0), 0, usize::from(max_sp > 0), 0));
            }
            if cfg.max_q > 0 || max_sq > 0 {
                starts.push((0, usize::from(cfg.max_q > 0), 0, usize::from(max_sq > 0)));
            }
            for start in starts {
                if within(&start) {
                    search.try_fit(start);
                }
            }

            let mut steps = 0;
            'walk: while steps < cfg.max_steps {
                let Some(current) = search.best.as_ref().map(|(o, _)| *o) else {
                    break;
                };
                for candidate in neighbours(current, seasonal) {
                    if steps >= cfg.max_steps {
                        break 'walk;
                    }
                    if !within(&candidate) || search.tried.contains(&candidate) {
                        continue;
                    }
                    steps += 1;
                    if search.try_fit(candidate) {
                        continue 'walk;
                    }
                }
                break;
            }
        } else {
            for p in 0..=cfg.max_p {
                for q in 0..=cfg.max_q {
                    for sp in 0..=max_sp {
                        for sq in 0..=max_sq {
                            let candidate = (p, q, sp, sq);
                            if within(&candidate) {
                                search.try_fit(candidate);
                            }
                        }
                    }
                }
            }
        }

        let models_evaluated = search.attempts;
        let (_, mut model) = search.best.ok_or_else(|| ModelError::NotConverged {
            message: format!("none of {} candidate ARIMA models could be fitted", models_evaluated),
        })?;
        model.dependent.clone_from(&self.dependent);

        info!(
            model = %model.label(),
            aic = model.aic(),
            models_evaluated,
            "selected ARIMA model"
        );

        Ok(AutoArimaResult {
            order: model.order,
            seasonal_order: model.seasonal_order,
            model,
            models_evaluated,
        })
    }
}

/// Candidate bookkeeping for one search
struct Search<'a> {
    y: &'a Array1<f64>,
    d: usize,
    big_d: usize,
    m: usize,
    intercept: bool,
    condition_on: usize,
    criterion: InformationCriterion,
    tried: HashSet<Orders>,
    attempts: usize,
    best: Option<(Orders, ArimaResult)>,
}

impl Search<'_> {
    /// Fit one candidate; true when it strictly improves on the best so far
    fn try_fit(&mut self, orders: Orders) -> bool {
        if !self.tried.insert(orders) {
            return false;
        }
        self.attempts += 1;

        let (p, q, sp, sq) = orders;
        let mut model = Arima::new(ArimaOrder::new(p, self.d, q))
            .with_intercept(self.intercept)
            .condition_on(self.condition_on);
        if self.m > 1 {
            model = model.seasonal(SeasonalOrder::new(sp, self.big_d, sq, self.m));
        }

        match model.fit(self.y) {
            Ok(fit) => {
                let score = self.criterion.of(&fit);
                debug!(model = %fit.label(), score, "candidate fitted");
                let better = score.is_finite()
                    && self
                        .best
                        .as_ref()
                        .is_none_or(|(_, best)| score < self.criterion.of(best));
                if better {
                    self.best = Some((orders, fit));
                }
                better
            }
            Err(e) => {
                debug!(p, q, seasonal_p = sp, seasonal_q = sq, error = %e, "candidate failed");
                false
            }
        }
    }
}

/// Stepwise moves from `(p, q, P, Q)`: seasonal terms first, then regular
fn neighbours(current: Orders, seasonal: bool) -> Vec<Orders> {
    let (p, q, sp, sq) = current;
    let moves: [(i64, i64); 8] = [
        (-1, 0),
        (1, 0),
        (0, -1),
        (0, 1),
        (-1, -1),
        (-1, 1),
        (1, -1),
        (1, 1),
    ];
    let shift = |v: usize, by: i64| -> Option<usize> {
        let moved = v as i64 + by;
        (moved >= 0).then_some(moved as usize)
    };

    let mut out = Vec::with_capacity(16);
    if seasonal {
        for (a, b) in moves {
            if let (Some(np), Some(nq)) = (shift(sp, a), shift(sq, b)) {
                out.push((p, q, np, nq));
            }
        }
    }
    for (a, b) in moves {
        if let (Some(np), Some(nq)) = (shift(p, a), shift(q, b)) {
            out.push((np, nq, sp, sq));
        }
    }
    out
}

/// Number of first differences needed for the ADF test to reject a unit root
pub fn ndiffs(x: &[f64], alpha: f64, max_d: usize) -> usize {
    let mut series = x.to_vec();
    let mut d = 0;
    while d < max_d && !is_constant(&series) {
        match adfuller(&Array1::from(series.clone()), None) {
            Ok(test) if test.p_value > alpha => {
                series = diff(&series, 1);
                d += 1;
            }
            Ok(_) => break,
            Err(e) => {
                debug!(d, error = %e, "ADF test unavailable, stopping differencing");
                break;
            }
        }
    }
    d
}

/// Number of seasonal differences, judged by seasonal strength
pub fn nsdiffs(x: &[f64], m: usize, max_seasonal_d: usize) -> usize {
    let mut series = x.to_vec();
    let mut big_d = 0;
    while big_d < max_seasonal_d {
        match seasonal_strength(&series, m) {
            Some(strength) if strength > SEASONAL_STRENGTH_THRESHOLD => {
                series = seasonal_diff(&series, m, 1);
                big_d += 1;
            }
            _ => break,
        }
    }
    big_d
}

/// Seasonal strength `max(0, 1 - var(remainder) / var(seasonal + remainder))`
///
/// Uses a classical additive decomposition: a centred moving average of
/// length `m` (2 x m for even `m`) as trend and period-wise means of the
/// detrended series as the seasonal pattern. `None` without two full
/// periods.
pub fn seasonal_strength(x: &[f64], m: usize) -> Option<f64> {
    let n = x.len();
    if m < 2 || n < 2 * m {
        return None;
    }

    let half = m / 2;
    let trend: Vec<Option<f64>> = (0..n)
        .map(|t| {
            if t < half || t + half >= n {
                return None;
            }
            let sum = if m % 2 == 0 {
                0.5 * (x[t - half] + x[t + half]) + x[t - half + 1..t + half].iter().sum::<f64>()
            } else {
                x[t - half..=t + half].iter().sum::<f64>()
            };
            Some(sum / m as f64)
        })
        .collect();

    let mut sums = vec![0.0; m];
    let mut counts = vec![0usize; m];
    for (t, tr) in trend.iter().enumerate() {
        if let Some(tr) = tr {
            sums[t % m] += x[t] - tr;
            counts[t % m] += 1;
        }
    }
    let mut pattern: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();
    let centre = pattern.iter().sum::<f64>() / m as f64;
    pattern.iter_mut().for_each(|v| *v -= centre);

    let mut detrended = Vec::new();
    let mut remainder = Vec::new();
    for (t, tr) in trend.iter().enumerate() {
        if let Some(tr) = tr {
            detrended.push(x[t] - tr);
            remainder.push(x[t] - tr - pattern[t % m]);
        }
    }

    let var_detrended = variance(&detrended);
    if var_detrended.is_nan() || var_detrended <= 0.0 {
        return Some(0.0);
    }
    Some((1.0 - variance(&remainder) / var_detrended).max(0.0))
}

fn variance(x: &[f64]) -> f64 {
    if x.len() < 2 {
        return 0.0;
    }
    let mean = x.iter().sum::<f64>() / x.len() as f64;
    x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (x.len() - 1) as f64
}
