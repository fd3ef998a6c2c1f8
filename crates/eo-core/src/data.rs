//! Core data structures for EconOxide
//!
//! This module provides the in-memory table the analyzers read from. Column
//! names are expected to be normalized by the loader before they get here.

mod builder;
mod dataframe;
mod index;
mod series;

#[cfg(test)]
mod tests;

// Re-exports
pub use builder::DataFrameBuilder;
pub use dataframe::DataFrame;
pub use index::{IndexValue, PanelIndex};
pub use series::{Series, SeriesValue};

// Type aliases for common use cases
pub type FloatArray = ndarray::Array1<f64>;
pub type IntArray = ndarray::Array1<i64>;
pub type BoolArray = ndarray::Array1<bool>;
pub type StringArray = Vec<String>;
pub type DatetimeArray = Vec<chrono::NaiveDateTime>;
pub type Matrix = ndarray::Array2<f64>;

/// Error types specific to data operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("Column '{column}' not found. Available columns: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("Index out of bounds: index {index}, length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Column '{column}' must be numeric, got {dtype}")]
    NonNumericData { column: String, dtype: &'static str },

    #[error("Missing data in column: {0}")]
    MissingData(String),

    #[error("Duplicate panel observation for entity {entity} at time {time}")]
    DuplicateObservation { entity: String, time: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;
