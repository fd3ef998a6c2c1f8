//! Panel analyzer
//!
//! 1. Index the rows by (entity, time) and fit pooled, fixed-effects and
//!    random-effects models.
//! 2. Choose fixed or random effects with a Hausman test. A failed test
//!    defaults to fixed effects.
//! 3. Test the chosen model's residuals for heteroskedasticity, serial
//!    correlation and cross-sectional dependence. Each test is guarded on
//!    its own.
//! 4. Re-fit with clustered, robust or unadjusted errors, in that order of
//!    priority.

use eo_core::DataFrame;
use eo_models::lm::Diagnostics;
use eo_models::TextSummary;
use eo_models::panel::{PanelData, PanelEstimator, PanelResult, hausman};
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::decision::{PanelChoice, choose_covariance, select_panel_model};
use crate::envelope::{
    AnalysisType, DiagnosticOutcome, Envelope, HausmanBlock, Inputs, ModelEstimation, PanelBody,
    TestStatistic, VarianceBlock,
};
use crate::error::{AnalysisError, Result};

/// Run the panel pipeline
///
/// Never fails: missing identifier columns or a failed base fit are
/// recorded in the envelope's `error`.
pub fn run_panel<S: AsRef<str>>(
    data: &DataFrame,
    y_var: &str,
    x_vars: &[S],
    entity_col: &str,
    time_col: &str,
    config: &AnalysisConfig,
) -> Envelope<PanelBody> {
    info!(analysis = "panel", y = y_var, entity = entity_col, time = time_col, "analysis started");
    let inputs = Inputs {
        y: y_var.to_string(),
        x: Some(x_vars.iter().map(|s| s.as_ref().to_string()).collect()),
        entity: Some(entity_col.to_string()),
        time: Some(time_col.to_string()),
        ..Inputs::default()
    };
    let mut env = Envelope::new(AnalysisType::Panel, inputs);

    if let Err(e) = pipeline(data, y_var, x_vars, entity_col, time_col, config, &mut env) {
        warn!(error = %e, "panel analysis aborted");
        env.fail(&e);
    }
    info!(analysis = "panel", failed = env.is_error(), "analysis finished");
    env
}

fn pipeline<S: AsRef<str>>(
    data: &DataFrame,
    y_var: &str,
    x_vars: &[S],
    entity_col: &str,
    time_col: &str,
    config: &AnalysisConfig,
    env: &mut Envelope<PanelBody>,
) -> Result<()> {
    if !data.has_column(entity_col) || !data.has_column(time_col) {
        return Err(AnalysisError::MissingPanelColumns {
            entity: entity_col.to_string(),
            time: time_col.to_string(),
            available: data.column_names().into_iter().map(String::from).collect(),
        });
    }
    if x_vars.is_empty() {
        return Err(AnalysisError::InvalidRequest(
            "at least one independent variable is required".to_string(),
        ));
    }
    let alpha = config.significance_level;
    let panel = PanelData::from_frame(data, y_var, x_vars, entity_col, time_col)?;
    debug!(
        n_obs = panel.nobs(),
        entities = panel.n_entities(),
        periods = panel.n_periods(),
        "panel indexed"
    );

    let pooled = PanelEstimator::pooled().fit(&panel)?;
    let fixed = PanelEstimator::fixed_effects().fit(&panel)?;
    let random = PanelEstimator::random_effects().fit(&panel)?;
    let models = &mut env.body.models;
    models.insert("cem_pooled_ols".to_string(), pooled.summary_text());
    models.insert("fem_fixed_effects".to_string(), fixed.summary_text());
    models.insert("rem_random_effects".to_string(), random.summary_text());

    let test = hausman(&fixed, &random);
    if let Err(e) = &test {
        warn!(error = %e, "Hausman test failed; defaulting to fixed effects");
    }
    let choice = select_panel_model(&test, alpha);
    env.body.model_selection_tests.hausman_test = Some(HausmanBlock {
        statistic: choice.statistic,
        p_value: choice.p_value,
        df: choice.df,
    });
    if let Some(note) = &choice.note {
        env.notes.push(note.clone());
    }
    env.body.chosen_model = Some(choice.model);

    let base = match choice.model {
        PanelChoice::FixedEffects => &fixed,
        PanelChoice::RandomEffects => &random,
    };
    let diagnostics = &mut env.body.final_model_diagnostics;
    let bp = breusch_pagan(&panel, base);
    let serial = wooldridge_outcome(&panel);
    let cross = pesaran_outcome(&panel, base);
    let hetero = bp.flags(alpha);
    let autocorr = serial.flags(alpha);
    let cross_dep = cross.flags(alpha);
    diagnostics.heteroskedasticity_breusch_pagan = Some(bp);
    diagnostics.autocorrelation_wooldridge = Some(serial);
    diagnostics.cross_sectional_dependence_pesaran_cd = Some(cross);

    let covariance = choose_covariance(hetero, autocorr, cross_dep);
    debug!(hetero, autocorr, cross_dep, covariance = %covariance, "covariance decision");
    if autocorr || cross_dep {
        env.notes.push(
            "Info: autocorrelation or cross-sectional dependence detected. Using clustered standard errors.",
        );
    } else if hetero {
        env.notes.push("Info: heteroskedasticity detected. Using robust standard errors.");
    }
    env.body.covariance_type = Some(covariance);

    let fitted = PanelEstimator::new(choice.model.model())
        .covariance(covariance)
        .fit(&panel)?;
    env.model_type = Some(format!("{} with {} standard errors", choice.model, covariance));
    env.body.variance_components = fitted.variance_components.as_ref().map(VarianceBlock::from);
    env.body.final_model_estimation = Some(ModelEstimation::from_panel(&fitted));
    Ok(())
}

fn breusch_pagan(panel: &PanelData, base: &PanelResult) -> DiagnosticOutcome<TestStatistic> {
    let result = Diagnostics::breusch_pagan(&base.residuals, panel.x())
        .map(|bp| TestStatistic::new(bp.statistic, bp.p_value));
    if let Err(e) = &result {
        warn!(error = %e, "panel Breusch-Pagan failed");
    }
    DiagnosticOutcome::from_result(result)
}

#[cfg(feature = "panel-diagnostics")]
fn wooldridge_outcome(panel: &PanelData) -> DiagnosticOutcome<TestStatistic> {
    let result =
        eo_models::panel::wooldridge(panel).map(|t| TestStatistic::new(t.statistic, t.p_value));
    if let Err(e) = &result {
        warn!(error = %e, "Wooldridge test failed");
    }
    DiagnosticOutcome::from_result(result)
}

#[cfg(not(feature = "panel-diagnostics"))]
fn wooldridge_outcome(_panel: &PanelData) -> DiagnosticOutcome<TestStatistic> {
    warn!("Wooldridge test not built");
    DiagnosticOutcome::Unavailable(crate::envelope::MISSING_FEATURE.to_string())
}

#[cfg(feature = "panel-diagnostics")]
fn pesaran_outcome(panel: &PanelData, base: &PanelResult) -> DiagnosticOutcome<TestStatistic> {
    let result = eo_models::panel::pesaran_cd(panel, &base.residuals)
        .map(|t| TestStatistic::new(t.statistic, t.p_value));
    if let Err(e) = &result {
        warn!(error = %e, "Pesaran CD test failed");
    }
    DiagnosticOutcome::from_result(result)
}

#[cfg(not(feature = "panel-diagnostics"))]
fn pesaran_outcome(_panel: &PanelData, _base: &PanelResult) -> DiagnosticOutcome<TestStatistic> {
    warn!("Pesaran CD test not built");
    DiagnosticOutcome::Unavailable(crate::envelope::MISSING_FEATURE.to_string())
}
