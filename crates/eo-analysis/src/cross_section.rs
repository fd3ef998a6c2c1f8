//! Cross-section analyzer: OLS with an HC1 fallback

use eo_core::DataFrame;
use eo_models::lm::{Diagnostics, LinearRegression, StandardErrorType};
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::decision::{autocorrelated, heteroskedastic, needs_robust_errors};
use crate::envelope::{
    AnalysisType, CrossSectionBody, Envelope, Inputs, ModelEstimation, TestStatistic, VifEntry,
};
use crate::error::{AnalysisError, Result};

pub const MODEL_STANDARD: &str = "OLS (Standard)";
pub const MODEL_ROBUST: &str = "OLS with Robust Standard Errors (HC1)";

/// Fit `y ~ const + x`, test its assumptions and re-fit with HC1 errors
/// when heteroskedasticity or autocorrelation shows up
///
/// Never fails: the first fatal error is recorded in the envelope's
/// `error` next to whatever was computed before it.
pub fn run_cross_section<S: AsRef<str>>(
    data: &DataFrame,
    y_var: &str,
    x_vars: &[S],
    config: &AnalysisConfig,
) -> Envelope<CrossSectionBody> {
    info!(analysis = "cross-section", y = y_var, regressors = x_vars.len(), "analysis started");
    let inputs = Inputs {
        y: y_var.to_string(),
        x: Some(x_vars.iter().map(|s| s.as_ref().to_string()).collect()),
        ..Inputs::default()
    };
    let mut env = Envelope::new(AnalysisType::CrossSection, inputs);

    if let Err(e) = pipeline(data, y_var, x_vars, config, &mut env) {
        warn!(error = %e, "cross-section analysis aborted");
        env.fail(&e);
    }
    info!(analysis = "cross-section", failed = env.is_error(), "analysis finished");
    env
}

fn pipeline<S: AsRef<str>>(
    data: &DataFrame,
    y_var: &str,
    x_vars: &[S],
    config: &AnalysisConfig,
    env: &mut Envelope<CrossSectionBody>,
) -> Result<()> {
    if x_vars.is_empty() {
        return Err(AnalysisError::InvalidRequest(
            "at least one independent variable is required".to_string(),
        ));
    }
    let alpha = config.significance_level;
    let model = LinearRegression::from_frame(data, y_var, x_vars)?;
    let initial = model.fit()?;
    let tests = &mut env.body.assumption_tests;

    match Diagnostics::vif(&initial.x, &initial.variable_names) {
        Ok(vifs) => {
            let high = vifs.iter().any(|v| v.vif > config.vif_threshold);
            debug!(high, "variance inflation factors");
            tests.multicollinearity_vif = Some(
                vifs.into_iter()
                    .map(|v| VifEntry {
                        feature: v.variable,
                        vif: v.vif,
                    })
                    .collect(),
            );
            if high {
                env.notes.push(format!(
                    "Warning: high multicollinearity detected (VIF > {}).",
                    config.vif_threshold
                ));
            }
        }
        Err(e) => warn!(error = %e, "VIF could not be computed; block omitted"),
    }

    let bp = Diagnostics::breusch_pagan(&initial.residuals, &initial.x)?;
    debug!(statistic = bp.statistic, p_value = bp.p_value, "Breusch-Pagan");
    tests.homoskedasticity_breusch_pagan = Some(TestStatistic::new(bp.statistic, bp.p_value));
    if heteroskedastic(bp.p_value, config) {
        env.notes.push(format!(
            "Info: heteroskedasticity detected (Breusch-Pagan p < {}). Using robust standard errors (HC1).",
            alpha
        ));
    }

    let dw = Diagnostics::durbin_watson(&initial.residuals);
    debug!(statistic = dw.statistic, "Durbin-Watson");
    tests.autocorrelation_durbin_watson = Some(TestStatistic::statistic_only(dw.statistic));
    if autocorrelated(dw.statistic, config) {
        env.notes.push(
            "Info: autocorrelation detected (Durbin-Watson outside the acceptable range). Using robust standard errors (HC1).",
        );
    }

    let jb = Diagnostics::jarque_bera(&initial.residuals)?;
    debug!(statistic = jb.statistic, p_value = jb.p_value, "Jarque-Bera");
    tests.normality_jarque_bera = Some(TestStatistic::new(jb.statistic, jb.p_value));
    if config.rejects(jb.p_value) {
        env.notes.push(format!(
            "Warning: residuals may not be normally distributed (Jarque-Bera p < {}).",
            alpha
        ));
    }

    let robust = needs_robust_errors(bp.p_value, dw.statistic, config);
    debug!(robust, "covariance decision");
    let fitted = if robust {
        env.model_type = Some(MODEL_ROBUST.to_string());
        model.robust(StandardErrorType::HC1).fit()?
    } else {
        env.model_type = Some(MODEL_STANDARD.to_string());
        initial
    };

    env.body.model_estimation = Some(ModelEstimation::from_regression(&fitted));
    Ok(())
}
