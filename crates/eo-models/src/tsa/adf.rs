//! Augmented Dickey-Fuller test with a constant
//!
//! `dy_t = a + g y_{t-1} + sum_j b_j dy_{t-j} + e_t`, the statistic is the
//! t-ratio of `g`. The lag length is picked by AIC over regressions that
//! share one estimation sample, then the chosen regression is re-run on
//! the longest sample that lag allows. P-values use MacKinnon's response
//! surface, critical values his finite-sample polynomial.

use ndarray::{Array1, Array2, s};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::base::{ModelError, Result, normal_cdf};
use crate::lm::ols::{loglike, ols};
use crate::tsa::{is_constant, lagmat};

// MacKinnon (1994) tau surface, one unit-root series, constant only
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALLP: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGEP: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) critical value polynomials in 1/nobs
const CRIT_1: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const CRIT_5: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const CRIT_10: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

/// Critical values at the usual levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    #[serde(rename = "1%")]
    pub one: f64,
    #[serde(rename = "5%")]
    pub five: f64,
    #[serde(rename = "10%")]
    pub ten: f64,
}

/// ADF test result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdfTest {
    pub statistic: f64,
    pub p_value: f64,
    /// Number of lagged differences in the final regression
    pub used_lag: usize,
    /// Observations in the final regression
    pub n_obs: usize,
    pub critical_values: CriticalValues,
    /// AIC of the selected lag during the search
    pub ic_best: Option<f64>,
}

impl AdfTest {
    /// Whether the unit root is rejected at `alpha`
    pub fn is_stationary(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Run the ADF test; `maxlag = None` uses `ceil(12 (n/100)^(1/4))`
pub fn adfuller(x: &Array1<f64>, maxlag: Option<usize>) -> Result<AdfTest> {
    let values = x.to_vec();
    let n = values.len();

    if is_constant(&values) {
        return Err(ModelError::InvalidConfig {
            message: "Invalid input, x is constant".to_string(),
        });
    }

    // Two columns (constant and level) on top of the lags
    let cap = n as i64 / 2 - 2;
    if cap < 0 {
        return Err(ModelError::too_few("ADF", 4, n, "observations"));
    }
    let cap = cap as usize;

    let maxlag = match maxlag {
        Some(lag) if lag > cap => {
            return Err(ModelError::InvalidConfig {
                message: format!("maxlag must be at most {} for {} observations", cap, n),
            });
        }
        Some(lag) => lag,
        None => {
            let default = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
            default.min(cap)
        }
    };

    let dx: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    let (used_lag, ic_best) = if maxlag == 0 {
        (0, None)
    } else {
        let (dep, full) = regression_frame(&values, &dx, maxlag, true);
        let mut best: Option<(f64, usize)> = None;

        for lag in 0..=maxlag {
            let exog = full.slice(s![.., ..lag + 2]).to_owned();
            let fit = ols(&dep, &exog)?;
            let aic = -2.0 * loglike(fit.ssr, dep.len()) + 2.0 * (lag + 2) as f64;
            if best.is_none_or(|(ic, _)| aic < ic) {
                best = Some((aic, lag));
            }
        }

        match best {
            Some((ic, lag)) => (lag, Some(ic)),
            None => (0, None),
        }
    };

    let (dep, exog) = regression_frame(&values, &dx, used_lag, false);
    let nobs = dep.len();
    let k = exog.ncols();
    if nobs <= k {
        return Err(ModelError::InsufficientData {
            n_samples: nobs,
            n_predictors: k,
        });
    }

    let fit = ols(&dep, &exog)?;
    let sigma2 = fit.ssr / (nobs - k) as f64;
    let se = (sigma2 * fit.xtx_inv[[0, 0]]).sqrt();
    let statistic = fit.params[0] / se;
    let p_value = mackinnon_p(statistic)?;

    debug!(statistic, p_value, used_lag, nobs, "ADF test");

    Ok(AdfTest {
        statistic,
        p_value,
        used_lag,
        n_obs: nobs,
        critical_values: critical_values(nobs),
        ic_best,
    })
}

/// Response and regressors for `lag` lagged differences
///
/// With `const_first` the columns are `[const, level, lags...]` (search
/// layout), otherwise `[level, lags..., const]`.
fn regression_frame(
    levels: &[f64],
    dx: &[f64],
    lag: usize,
    const_first: bool,
) -> (Array1<f64>, Array2<f64>) {
    let lags = lagmat(dx, lag);
    let rows = lags.nrows();
    let offset = usize::from(const_first);

    let mut exog = Array2::<f64>::ones((rows, lag + 2));
    for r in 0..rows {
        let t = lag + r;
        exog[[r, offset]] = levels[t];
        for j in 0..lag {
            exog[[r, offset + 1 + j]] = lags[[r, j]];
        }
    }

    let dep: Array1<f64> = (0..rows).map(|r| dx[lag + r]).collect();
    (dep, exog)
}

/// MacKinnon approximate p-value for the constant-only case
pub fn mackinnon_p(stat: f64) -> Result<f64> {
    if stat > TAU_MAX {
        return Ok(1.0);
    }
    if stat < TAU_MIN {
        return Ok(0.0);
    }

    let coefs: &[f64] = if stat <= TAU_STAR {
        &TAU_SMALLP
    } else {
        &TAU_LARGEP
    };
    let z = coefs.iter().rev().fold(0.0, |acc, &c| acc * stat + c);
    normal_cdf(z)
}

/// MacKinnon (2010) critical values for `nobs` observations
pub fn critical_values(nobs: usize) -> CriticalValues {
    let inv = 1.0 / nobs as f64;
    let poly = |b: [f64; 4]| b[0] + b[1] * inv + b[2] * inv.powi(2) + b[3] * inv.powi(3);
    CriticalValues {
        one: poly(CRIT_1),
        five: poly(CRIT_5),
        ten: poly(CRIT_10),
    }
}
