//! Analysis error types

use thiserror::Error;

use eo_core::data::DataError;
use eo_models::ModelError;

/// Errors that abort an analysis pipeline
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Data-related error
    #[error(transparent)]
    Data(#[from] DataError),

    /// An estimator or test failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Panel identifier columns absent from the frame
    #[error("Column '{entity}' or '{time}' not found. Columns read: {available:?}")]
    MissingPanelColumns {
        entity: String,
        time: String,
        available: Vec<String>,
    },

    /// Panel request without identifier column names
    #[error("Panel analysis requires 'entity_col' and 'time_col'.")]
    MissingPanelIdentifiers,

    /// Unrecognised `data_type` tag
    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    /// Request that cannot be analysed as given
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
