//! Dispatch by analysis type and JSON output

use std::fmt;
use std::str::FromStr;

use eo_core::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::cross_section::run_cross_section;
use crate::envelope::AnalysisOutcome;
use crate::error::AnalysisError;
use crate::panel::run_panel;
use crate::time_series::run_time_series;

/// Analysis family requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    CrossSection,
    TimeSeries,
    Panel,
}

impl FromStr for DataType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cross_section" => Ok(DataType::CrossSection),
            "time_series" => Ok(DataType::TimeSeries),
            "panel" => Ok(DataType::Panel),
            _ => Err(AnalysisError::UnknownDataType(s.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::CrossSection => write!(f, "cross_section"),
            DataType::TimeSeries => write!(f, "time_series"),
            DataType::Panel => write!(f, "panel"),
        }
    }
}

/// Variable selection and analysis type
///
/// `data_type` stays a plain string so that an unknown tag is reported in
/// the result rather than failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub y_var: String,
    #[serde(default)]
    pub x_vars: Vec<String>,
    pub data_type: String,
    #[serde(default)]
    pub entity_col: Option<String>,
    #[serde(default)]
    pub time_col: Option<String>,
    #[serde(default)]
    pub seasonal_period: Option<usize>,
}

impl AnalysisRequest {
    pub fn cross_section<S: Into<String>>(
        y_var: &str,
        x_vars: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            y_var: y_var.to_string(),
            x_vars: x_vars.into_iter().map(Into::into).collect(),
            data_type: DataType::CrossSection.to_string(),
            ..Self::default()
        }
    }

    pub fn time_series(y_var: &str, seasonal_period: usize) -> Self {
        Self {
            y_var: y_var.to_string(),
            data_type: DataType::TimeSeries.to_string(),
            seasonal_period: Some(seasonal_period),
            ..Self::default()
        }
    }

    pub fn panel<S: Into<String>>(
        y_var: &str,
        x_vars: impl IntoIterator<Item = S>,
        entity_col: &str,
        time_col: &str,
    ) -> Self {
        Self {
            y_var: y_var.to_string(),
            x_vars: x_vars.into_iter().map(Into::into).collect(),
            data_type: DataType::Panel.to_string(),
            entity_col: Some(entity_col.to_string()),
            time_col: Some(time_col.to_string()),
            ..Self::default()
        }
    }

    /// Label the time-series sample with this column
    pub fn with_time_col(mut self, time_col: &str) -> Self {
        self.time_col = Some(time_col.to_string());
        self
    }
}

/// Run the requested analysis with the default configuration, as JSON
pub fn run_analysis(data: &DataFrame, request: &AnalysisRequest) -> String {
    run_analysis_with_config(data, request, &AnalysisConfig::default())
}

/// Run the requested analysis, as JSON
pub fn run_analysis_with_config(
    data: &DataFrame,
    request: &AnalysisRequest,
    config: &AnalysisConfig,
) -> String {
    analyze(data, request, config).to_json()
}

/// Run the requested analysis
///
/// Unknown data types and panel requests without identifier columns are
/// rejected before any analyzer runs.
pub fn analyze(
    data: &DataFrame,
    request: &AnalysisRequest,
    config: &AnalysisConfig,
) -> AnalysisOutcome {
    let data_type = match request.data_type.parse::<DataType>() {
        Ok(t) => t,
        Err(e) => {
            warn!(data_type = %request.data_type, "request rejected");
            return e.into();
        }
    };
    debug!(data_type = %data_type, "dispatching analysis");

    match data_type {
        DataType::CrossSection => AnalysisOutcome::CrossSection(run_cross_section(
            data,
            &request.y_var,
            &request.x_vars,
            config,
        )),
        DataType::TimeSeries => AnalysisOutcome::TimeSeries(run_time_series(
            data,
            &request.y_var,
            request.seasonal_period.unwrap_or(1),
            request.time_col.as_deref(),
            config,
        )),
        DataType::Panel => {
            let entity = request.entity_col.as_deref().filter(|s| !s.is_empty());
            let time = request.time_col.as_deref().filter(|s| !s.is_empty());
            match (entity, time) {
                (Some(entity), Some(time)) => AnalysisOutcome::Panel(run_panel(
                    data,
                    &request.y_var,
                    &request.x_vars,
                    entity,
                    time,
                    config,
                )),
                _ => {
                    warn!("panel request without entity or time column");
                    AnalysisError::MissingPanelIdentifiers.into()
                }
            }
        }
    }
}
