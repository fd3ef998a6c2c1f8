//! Statistical models for EconOxide
//!
//! The estimators and diagnostic tests the analysis pipelines are built
//! from:
//! - [`lm`]: OLS with classical or HC1 covariance, VIF, Breusch-Pagan,
//!   Durbin-Watson and Jarque-Bera
//! - [`tsa`]: ADF, ARIMA by conditional sum of squares, automatic order
//!   selection, Ljung-Box and ARCH-LM
//! - [`panel`]: pooled, fixed-effects and random-effects estimators,
//!   Hausman, and (feature `panel-diagnostics`) Wooldridge and Pesaran CD

pub mod base;
pub mod error;
pub mod linalg;
pub mod lm;
pub mod panel;
pub mod tsa;

pub use base::{
    Coefficient, ModelResultTrait, ModelStatistics, ModelSummary, ModelType, Result, TextSummary,
};
pub use error::ModelError;
