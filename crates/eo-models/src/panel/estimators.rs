//! Pooled, fixed-effects and random-effects estimators

use ndarray::{Array1, Array2, s};
use tracing::debug;

use crate::base::{
    Coefficient, ModelError, ModelResultTrait, ModelStatistics, ModelSummary, ModelType,
    Reference, Result, TextSummary, coefficient_table, f_sf,
};
use crate::lm::ols::{ols, wald_f};
use crate::panel::covariance::{self, CovarianceInput};
use crate::panel::{PanelCovariance, PanelData, PanelModel};

/// Swamy-Arora variance components of a random-effects fit
#[derive(Debug, Clone, PartialEq)]
pub struct VarianceComponents {
    /// Idiosyncratic variance
    pub sigma2_e: f64,
    /// Entity effect variance, clipped at zero
    pub sigma2_u: f64,
    /// Share of variance due to the entity effect
    pub rho: f64,
    /// Quasi-demeaning weight per entity
    pub theta: Vec<f64>,
}

/// Fitted panel model
#[derive(Debug, Clone)]
pub struct PanelResult {
    pub model: PanelModel,
    pub covariance_type: PanelCovariance,
    pub dependent: String,
    pub names: Vec<String>,
    pub params: Array1<f64>,
    pub covariance: Array2<f64>,
    pub coefficients: Vec<Coefficient>,
    /// `y - X b` on the untransformed data
    pub residuals: Array1<f64>,
    /// Residuals of the transformed regression
    pub idiosyncratic: Array1<f64>,
    pub n_obs: usize,
    pub n_entities: usize,
    pub n_periods: usize,
    pub variance_components: Option<VarianceComponents>,
    pub model_statistics: ModelStatistics,
}

impl PanelResult {
    /// Coefficient estimate by name
    pub fn param(&self, name: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.estimate)
    }

    pub fn r_squared_within(&self) -> f64 {
        self.model_statistics.r_squared_within.unwrap_or(f64::NAN)
    }

    pub fn r_squared_between(&self) -> f64 {
        self.model_statistics.r_squared_between.unwrap_or(f64::NAN)
    }

    pub fn r_squared_overall(&self) -> f64 {
        self.model_statistics.r_squared_overall.unwrap_or(f64::NAN)
    }
}

impl ModelResultTrait for PanelResult {
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
        let model_type = match self.model {
            PanelModel::Pooled => ModelType::PooledOls,
            PanelModel::FixedEffects => ModelType::FixedEffects,
            PanelModel::RandomEffects => ModelType::RandomEffects,
        };
        let mut summary = ModelSummary::new(
            model_type,
            self.dependent.clone(),
            self.covariance_type.to_string(),
            self.n_obs,
            self.coefficients.clone(),
            self.model_statistics,
        )
        .with_detail("Estimator", self.model)
        .with_detail("Entities", self.n_entities)
        .with_detail("Time periods", self.n_periods);

        if let Some(vc) = &self.variance_components {
            summary = summary
                .with_detail("Effects Variance", format!("{:.6}", vc.sigma2_u))
                .with_detail("Residual Variance", format!("{:.6}", vc.sigma2_e))
                .with_detail("Rho", format!("{:.4}", vc.rho));
        }
        summary
    }
}

impl TextSummary for PanelResult {
    fn summary_text(&self) -> String {
        self.summary().to_string()
    }
}

/// Panel estimator: a model family and a covariance type
#[derive(Debug, Clone, Copy)]
pub struct PanelEstimator {
    model: PanelModel,
    covariance: PanelCovariance,
}

impl PanelEstimator {
    pub fn new(model: PanelModel) -> Self {
        Self {
            model,
            covariance: PanelCovariance::Unadjusted,
        }
    }

    pub fn pooled() -> Self {
        Self::new(PanelModel::Pooled)
    }

    pub fn fixed_effects() -> Self {
        Self::new(PanelModel::FixedEffects)
    }

    pub fn random_effects() -> Self {
        Self::new(PanelModel::RandomEffects)
    }

    /// Use a different covariance estimator
    pub fn covariance(mut self, covariance: PanelCovariance) -> Self {
        self.covariance = covariance;
        self
    }

    pub fn model(&self) -> PanelModel {
        self.model
    }

    /// Fit the model
    pub fn fit(&self, data: &PanelData) -> Result<PanelResult> {
        let y = data.y();
        let x = data.x();
        let (n, k) = x.dim();
        let n_entities = data.n_entities();

        let (ty, tx, extra_df, components) = match self.model {
            PanelModel::Pooled => (y.clone(), x.clone(), 0, None),
            PanelModel::FixedEffects => {
                let ones = vec![1.0; n_entities];
                let y_mean = y.mean().unwrap_or(0.0);
                let ty = data.demean(y, &ones) + y_mean;
                let x_mean = x
                    .mean_axis(ndarray::Axis(0))
                    .unwrap_or_else(|| Array1::zeros(k));
                let tx = data.demean_matrix(x, &ones) + &x_mean;
                (ty, tx, n_entities.saturating_sub(1), None)
            }
            PanelModel::RandomEffects => {
                let vc = swamy_arora(data)?;
                let ty = data.demean(y, &vc.theta);
                let tx = data.demean_matrix(x, &vc.theta);
                (ty, tx, 0, Some(vc))
            }
        };

        if n <= k + extra_df {
            return Err(ModelError::InsufficientData {
                n_samples: n,
                n_predictors: k + extra_df,
            });
        }

        let fit = ols(&ty, &tx)?;
        let input = CovarianceInput {
            x: &tx,
            resid: &fit.residuals,
            xtx_inv: &fit.xtx_inv,
            groups: data.groups(),
            extra_df,
        };
        let df_resid = input.df_resid();
        let cov = covariance::estimate(self.covariance, &input);
        let coefficients = coefficient_table(
            data.names(),
            &fit.params,
            &cov,
            Reference::StudentT(df_resid as f64),
        )?;

        let residuals = y - &x.dot(&fit.params);
        let (within, between, overall) = r_squared_decomposition(data, &fit.params, &residuals);
        let r_squared = match self.model {
            PanelModel::Pooled => overall,
            PanelModel::FixedEffects => within,
            PanelModel::RandomEffects => fit.r_squared(true),
        };

        let (f_statistic, q) = wald_f(&fit.params, &cov, true).unwrap_or((f64::NAN, k - 1));
        let f_p_value = if q > 0 {
            Some(f_sf(f_statistic, q as f64, df_resid as f64)?)
        } else {
            None
        };

        debug!(
            model = %self.model,
            covariance = %self.covariance,
            n_obs = n,
            n_entities,
            r_squared,
            "fitted panel model"
        );

        Ok(PanelResult {
            model: self.model,
            covariance_type: self.covariance,
            dependent: data.design.response.clone(),
            names: data.names().to_vec(),
            params: fit.params,
            covariance: cov,
            coefficients,
            residuals,
            idiosyncratic: fit.residuals,
            n_obs: n,
            n_entities,
            n_periods: data.n_periods(),
            variance_components: components,
            model_statistics: ModelStatistics {
                r_squared: Some(r_squared),
                r_squared_within: Some(within),
                r_squared_between: Some(between),
                r_squared_overall: Some(overall),
                f_statistic: (q > 0).then_some(f_statistic),
                f_p_value,
                residual_std_error: Some((fit.ssr / df_resid.max(1) as f64).sqrt()),
                df_residual: Some(df_resid),
                df_model: Some(k - 1),
                ..ModelStatistics::default()
            },
        })
    }
}

fn ratio_r2(ssr: f64, tss: f64) -> f64 {
    if tss > 0.0 { 1.0 - ssr / tss } else { f64::NAN }
}

/// Within, between and overall R-squared of the parameters `b`
fn r_squared_decomposition(
    data: &PanelData,
    b: &Array1<f64>,
    residuals: &Array1<f64>,
) -> (f64, f64, f64) {
    let y = data.y();
    let x = data.x();

    let y_mean = y.mean().unwrap_or(0.0);
    let overall = ratio_r2(
        residuals.dot(residuals),
        y.iter().map(|v| (v - y_mean).powi(2)).sum(),
    );

    let ones = vec![1.0; data.n_entities()];
    let yw = data.demean(y, &ones);
    let ew = &yw - &data.demean_matrix(x, &ones).dot(b);
    let within = ratio_r2(ew.dot(&ew), yw.dot(&yw));

    let ybar = data.entity_means(y);
    let eb = &ybar - &data.entity_means_matrix(x).dot(b);
    let ybar_mean = ybar.mean().unwrap_or(0.0);
    let between = ratio_r2(
        eb.dot(&eb),
        ybar.iter().map(|v| (v - ybar_mean).powi(2)).sum(),
    );

    (within, between, overall)
}

/// Swamy-Arora variance components from the within and between regressions
fn swamy_arora(data: &PanelData) -> Result<VarianceComponents> {
    let y = data.y();
    let x = data.x();
    let (n, k) = x.dim();
    let g = data.n_entities();

    if g <= k || n <= g + k - 1 {
        return Err(ModelError::InsufficientData {
            n_samples: g,
            n_predictors: k,
        });
    }

    // Within regression without the constant, which demeans to zero
    let ones = vec![1.0; g];
    let yw = data.demean(y, &ones);
    let ssr_within = if k > 1 {
        let xw = data.demean_matrix(x, &ones).slice(s![.., 1..]).to_owned();
        ols(&yw, &xw)?.ssr
    } else {
        yw.dot(&yw)
    };
    let sigma2_e = ssr_within / (n - g - (k - 1)) as f64;

    let between = ols(&data.entity_means(y), &data.entity_means_matrix(x))?;
    let sizes = data.group_sizes();
    let t_bar = g as f64 / sizes.iter().map(|&t| 1.0 / t as f64).sum::<f64>();
    let sigma2_u = (between.ssr / (g - k) as f64 - sigma2_e / t_bar).max(0.0);

    let theta = sizes
        .iter()
        .map(|&t| {
            let denom = t as f64 * sigma2_u + sigma2_e;
            if denom > 0.0 {
                1.0 - (sigma2_e / denom).sqrt()
            } else {
                0.0
            }
        })
        .collect();
    let total = sigma2_u + sigma2_e;
    let rho = if total > 0.0 { sigma2_u / total } else { 0.0 };

    debug!(sigma2_e, sigma2_u, rho, "random effects variance components");

    Ok(VarianceComponents {
        sigma2_e,
        sigma2_u,
        rho,
        theta,
    })
}
