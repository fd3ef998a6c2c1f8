//! Adaptive econometric analysis
//!
//! Given a data frame and a variable selection, each analyzer fits a
//! model, runs its assumption tests and, where a test calls for it,
//! re-fits with a corrected specification:
//! - [`cross_section`]: OLS, switching to HC1 errors on heteroskedasticity
//!   or autocorrelation
//! - [`time_series`]: ADF and automatic (S)ARIMA order selection, with
//!   residual checks
//! - [`panel`]: pooled, fixed and random effects, Hausman model choice and
//!   covariance escalation
//!
//! [`router::run_analysis`] dispatches on the requested type and returns
//! the result envelope as JSON. Failures end up in the envelope's `error`
//! field; nothing here panics or returns `Err` to the caller.

pub mod config;
pub mod cross_section;
pub mod decision;
pub mod envelope;
pub mod error;
pub mod panel;
pub mod router;
pub mod serialize;
pub mod time_series;

#[cfg(test)]
mod tests;

pub use config::AnalysisConfig;
pub use envelope::{AnalysisOutcome, DiagnosticOutcome, Envelope, Notes, TestStatistic};
pub use error::{AnalysisError, Result};
pub use router::{AnalysisRequest, DataType, analyze, run_analysis, run_analysis_with_config};
