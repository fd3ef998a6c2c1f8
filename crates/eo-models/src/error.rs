//! Model-related error types

use thiserror::Error;

use eo_core::data::DataError;

/// Model-related errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// Data-related error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Numerical computation error
    #[error("Numerical error: {message} (operation: {operation})")]
    NumericalError {
        /// Error message
        message: String,
        /// Operation that failed
        operation: String,
    },

    /// Insufficient data for model fitting
    #[error("Not enough data: {n_samples} samples for {n_predictors} predictors")]
    InsufficientData {
        /// Number of samples
        n_samples: usize,
        /// Number of predictors
        n_predictors: usize,
    },

    /// A test's lag or grouping structure leaves too few observations
    #[error("{test} needs at least {required} {what}, got {available}")]
    TooFewObservations {
        /// Name of the test
        test: &'static str,
        /// What is being counted
        what: String,
        required: usize,
        available: usize,
    },

    /// Iterative estimation failed to produce a usable solution
    #[error("Failed to converge: {message}")]
    NotConverged {
        /// What went wrong
        message: String,
    },

    /// Singular matrix encountered
    #[error("Singular matrix encountered in {operation}")]
    SingularMatrix {
        /// Operation that needed the inverse
        operation: String,
    },

    /// Invalid model configuration
    #[error("Invalid model configuration: {message}")]
    InvalidConfig {
        /// Configuration error message
        message: String,
    },

    /// A test statistic could not be formed from the fitted models
    #[error("{test} could not be computed: {message}")]
    TestFailed {
        /// Name of the test
        test: &'static str,
        /// Why it failed
        message: String,
    },
}

impl ModelError {
    pub(crate) fn numerical(message: impl Into<String>, operation: &str) -> Self {
        ModelError::NumericalError {
            message: message.into(),
            operation: operation.to_string(),
        }
    }

    pub(crate) fn singular(operation: &str) -> Self {
        ModelError::SingularMatrix {
            operation: operation.to_string(),
        }
    }

    pub(crate) fn too_few(
        test: &'static str,
        required: usize,
        available: usize,
        what: impl Into<String>,
    ) -> Self {
        ModelError::TooFewObservations {
            test,
            what: what.into(),
            required,
            available,
        }
    }

    pub(crate) fn test_failed(test: &'static str, message: impl Into<String>) -> Self {
        ModelError::TestFailed {
            test,
            message: message.into(),
        }
    }
}
