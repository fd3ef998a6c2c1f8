//! Result envelopes
//!
//! Every analysis run produces one [`Envelope`]: the fields all analyses
//! share plus a body whose shape depends on the analysis kind. The body is
//! flattened, so on the wire the envelope is a single JSON object.

use std::fmt;
use std::slice;

use eo_core::IndexValue;
use eo_models::lm::LinearRegressionResult;
use eo_models::panel::{PanelCovariance, PanelResult, VarianceComponents};
use eo_models::tsa::{AdfTest, ArimaOrder, ArimaResult, SeasonalOrder};
use eo_models::{ModelResultTrait, ModelSummary};
use indexmap::IndexMap;
use ndarray::{Array1, Array2};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::decision::PanelChoice;
use crate::error::AnalysisError;
use crate::serialize;

/// Analysis family, with its wire label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisType {
    #[serde(rename = "Cross-Section")]
    CrossSection,
    #[serde(rename = "Time Series (Auto-ARIMA)")]
    TimeSeries,
    #[serde(rename = "Panel Data")]
    Panel,
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisType::CrossSection => write!(f, "Cross-Section"),
            AnalysisType::TimeSeries => write!(f, "Time Series (Auto-ARIMA)"),
            AnalysisType::Panel => write!(f, "Panel Data"),
        }
    }
}

/// Echo of the caller's variable selection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inputs {
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasonal_period: Option<usize>,
}

/// Decision log, in the order the decisions were taken
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Notes(Vec<String>);

impl Notes {
    pub fn push(&mut self, note: impl Into<String>) {
        self.0.push(note.into());
    }

    pub fn iter(&self) -> slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any note contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.0.iter().any(|n| n.contains(needle))
    }
}

impl<'a> IntoIterator for &'a Notes {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One test outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestStatistic {
    pub statistic: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
}

impl TestStatistic {
    pub fn new(statistic: f64, p_value: f64) -> Self {
        Self {
            statistic,
            p_value: Some(p_value),
            conclusion: None,
        }
    }

    /// A statistic without a reference distribution
    pub fn statistic_only(statistic: f64) -> Self {
        Self {
            statistic,
            p_value: None,
            conclusion: None,
        }
    }

    /// Attach `rejected` or `accepted` depending on the p-value at `alpha`
    pub fn concluding(mut self, alpha: f64, rejected: &str, accepted: &str) -> Self {
        let text = if self.rejects(alpha) { rejected } else { accepted };
        self.conclusion = Some(text.to_string());
        self
    }

    /// p-value known and below `alpha`
    pub fn rejects(&self, alpha: f64) -> bool {
        self.p_value.is_some_and(|p| p < alpha)
    }
}

/// Message recorded for diagnostics compiled out of the build
pub const MISSING_FEATURE: &str = "This feature requires panel diagnostics support";

/// A guarded diagnostic: its result, or why there is none
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticOutcome<T> {
    Computed(T),
    /// The test is not available in this build
    Unavailable(String),
    /// The test ran and failed
    Failed(String),
}

impl<T> DiagnosticOutcome<T> {
    pub fn from_result<E: fmt::Display>(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(v) => DiagnosticOutcome::Computed(v),
            Err(e) => DiagnosticOutcome::Failed(e.to_string()),
        }
    }

    pub fn computed(&self) -> Option<&T> {
        match self {
            DiagnosticOutcome::Computed(v) => Some(v),
            _ => None,
        }
    }

    /// The `error` text written in place of a result
    pub fn error_message(&self) -> Option<String> {
        match self {
            DiagnosticOutcome::Computed(_) => None,
            DiagnosticOutcome::Unavailable(reason) => Some(reason.clone()),
            DiagnosticOutcome::Failed(message) => Some(format!("Failed: {}", message)),
        }
    }
}

impl DiagnosticOutcome<TestStatistic> {
    /// Computed and significant at `alpha`
    pub fn flags(&self, alpha: f64) -> bool {
        self.computed().is_some_and(|t| t.rejects(alpha))
    }
}

impl<T: Serialize> Serialize for DiagnosticOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let DiagnosticOutcome::Computed(v) = self {
            return v.serialize(serializer);
        }
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("error", &self.error_message())?;
        map.end()
    }
}

/// Final estimation block
#[derive(Debug, Clone, Serialize)]
pub struct ModelEstimation {
    #[serde(with = "serialize::summary_text")]
    pub summary_table: ModelSummary,
    pub coefficients: IndexMap<String, f64>,
    pub p_values: IndexMap<String, Option<f64>>,
    /// Covariance of the estimates in `coefficients` order
    #[serde(with = "serialize::array2")]
    pub cov_params: Array2<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_squared: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_squared_within: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_squared_between: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_squared_overall: Option<f64>,
}

impl ModelEstimation {
    fn from_summary(summary: ModelSummary, cov_params: Array2<f64>) -> Self {
        let coefficients = summary
            .coefficients
            .iter()
            .map(|c| (c.name.clone(), c.estimate))
            .collect();
        let p_values = summary
            .coefficients
            .iter()
            .map(|c| (c.name.clone(), c.p_value))
            .collect();
        Self {
            summary_table: summary,
            coefficients,
            p_values,
            cov_params,
            r_squared: None,
            aic: None,
            r_squared_within: None,
            r_squared_between: None,
            r_squared_overall: None,
        }
    }

    pub fn from_regression(result: &LinearRegressionResult) -> Self {
        let mut estimation = Self::from_summary(result.summary(), result.covariance.clone());
        estimation.r_squared = result.model_statistics.r_squared;
        estimation
    }

    pub fn from_arima(result: &ArimaResult) -> Self {
        let mut estimation = Self::from_summary(result.summary(), result.covariance.clone());
        estimation.aic = Some(result.aic());
        estimation
    }

    pub fn from_panel(result: &PanelResult) -> Self {
        let mut estimation = Self::from_summary(result.summary(), result.covariance.clone());
        let stats = &result.model_statistics;
        estimation.r_squared_within = stats.r_squared_within;
        estimation.r_squared_between = stats.r_squared_between;
        estimation.r_squared_overall = stats.r_squared_overall;
        estimation
    }
}

// ==================== Cross-section ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VifEntry {
    pub feature: String,
    #[serde(rename = "VIF")]
    pub vif: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrossSectionTests {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multicollinearity_vif: Option<Vec<VifEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homoskedasticity_breusch_pagan: Option<TestStatistic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocorrelation_durbin_watson: Option<TestStatistic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normality_jarque_bera: Option<TestStatistic>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrossSectionBody {
    pub assumption_tests: CrossSectionTests,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_estimation: Option<ModelEstimation>,
}

// ==================== Time series ====================

/// First and last label of the analysed series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub n_obs: usize,
    #[serde(with = "serialize::label")]
    pub start: IndexValue,
    #[serde(with = "serialize::label")]
    pub end: IndexValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdfBlock {
    #[serde(flatten)]
    pub test: TestStatistic,
    pub used_lag: usize,
    pub critical_values: IndexMap<String, f64>,
}

impl AdfBlock {
    pub fn new(adf: &AdfTest, alpha: f64) -> Self {
        let cv = &adf.critical_values;
        Self {
            test: TestStatistic::new(adf.statistic, adf.p_value).concluding(
                alpha,
                "stationary",
                "not stationary",
            ),
            used_lag: adf.used_lag,
            critical_values: [("1%", cv.one), ("5%", cv.five), ("10%", cv.ten)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationarityTests {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adf_test_original_data: Option<AdfBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSelection {
    pub chosen_order: ArimaOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasonal_order: Option<SeasonalOrder>,
    pub aic: f64,
    pub models_evaluated: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResidualTests {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocorrelation_ljung_box: Option<TestStatistic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heteroskedasticity_arch: Option<TestStatistic>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeSeriesBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<Sample>,
    pub stationarity_tests: StationarityTests,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_selection: Option<ModelSelection>,
    pub assumption_tests_on_residuals: ResidualTests,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_estimation: Option<ModelEstimation>,
}

// ==================== Panel ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HausmanBlock {
    /// `null` when the test could not be computed
    pub statistic: Option<f64>,
    pub p_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub df: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelSelectionTests {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hausman_test: Option<HausmanBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelDiagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heteroskedasticity_breusch_pagan: Option<DiagnosticOutcome<TestStatistic>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocorrelation_wooldridge: Option<DiagnosticOutcome<TestStatistic>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_sectional_dependence_pesaran_cd: Option<DiagnosticOutcome<TestStatistic>>,
}

/// Random-effects variance decomposition of the final fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceBlock {
    pub sigma2_u: f64,
    pub sigma2_e: f64,
    pub rho: f64,
    /// Quasi-demeaning weight per entity
    #[serde(with = "serialize::array1")]
    pub theta: Array1<f64>,
}

impl From<&VarianceComponents> for VarianceBlock {
    fn from(vc: &VarianceComponents) -> Self {
        Self {
            sigma2_u: vc.sigma2_u,
            sigma2_e: vc.sigma2_e,
            rho: vc.rho,
            theta: Array1::from(vc.theta.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PanelBody {
    /// Text summary of each candidate fit
    pub models: IndexMap<String, String>,
    pub model_selection_tests: ModelSelectionTests,
    pub chosen_model: Option<PanelChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covariance_type: Option<PanelCovariance>,
    pub final_model_diagnostics: PanelDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance_components: Option<VarianceBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_model_estimation: Option<ModelEstimation>,
}

// ==================== Envelope ====================

/// The result of one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<B> {
    pub analysis_type: AnalysisType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    pub inputs: Inputs,
    #[serde(flatten)]
    pub body: B,
    pub notes: Notes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<B: Default> Envelope<B> {
    pub fn new(analysis_type: AnalysisType, inputs: Inputs) -> Self {
        Self {
            analysis_type,
            model_type: None,
            inputs,
            body: B::default(),
            notes: Notes::default(),
            error: None,
        }
    }
}

impl<B> Envelope<B> {
    /// Record the error that stopped the pipeline
    pub fn fail(&mut self, error: &AnalysisError) {
        self.error = Some(error.to_string());
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Router refusal, produced before any analyzer runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub error: String,
}

/// Any analysis result
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    CrossSection(Envelope<CrossSectionBody>),
    TimeSeries(Envelope<TimeSeriesBody>),
    Panel(Envelope<PanelBody>),
    Rejected(Rejection),
}

impl AnalysisOutcome {
    pub fn error(&self) -> Option<&str> {
        match self {
            AnalysisOutcome::CrossSection(env) => env.error.as_deref(),
            AnalysisOutcome::TimeSeries(env) => env.error.as_deref(),
            AnalysisOutcome::Panel(env) => env.error.as_deref(),
            AnalysisOutcome::Rejected(r) => Some(&r.error),
        }
    }

    pub fn notes(&self) -> Option<&Notes> {
        match self {
            AnalysisOutcome::CrossSection(env) => Some(&env.notes),
            AnalysisOutcome::TimeSeries(env) => Some(&env.notes),
            AnalysisOutcome::Panel(env) => Some(&env.notes),
            AnalysisOutcome::Rejected(_) => None,
        }
    }

    pub fn to_json(&self) -> String {
        serialize::to_json(self)
    }
}

impl From<AnalysisError> for AnalysisOutcome {
    fn from(error: AnalysisError) -> Self {
        AnalysisOutcome::Rejected(Rejection {
            error: error.to_string(),
        })
    }
}
