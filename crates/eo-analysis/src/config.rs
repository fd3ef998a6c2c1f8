//! Thresholds and search settings shared by the analyzers

use eo_models::tsa::AutoArimaConfig;
use serde::{Deserialize, Serialize};

/// Analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Threshold below which a test p-value counts as a rejection
    pub significance_level: f64,
    /// VIF above which multicollinearity is reported
    pub vif_threshold: f64,
    /// Durbin-Watson range treated as free of autocorrelation
    pub durbin_watson_bounds: (f64, f64),
    /// Lag of the Ljung-Box test on ARIMA residuals
    pub ljung_box_lags: usize,
    /// ARCH-LM lags; `None` uses min(10, n/5)
    pub arch_lags: Option<usize>,
    /// Order search for the time-series analyzer
    pub arima: AutoArimaConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            vif_threshold: 10.0,
            durbin_watson_bounds: (1.5, 2.5),
            ljung_box_lags: 10,
            arch_lags: None,
            arima: AutoArimaConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Whether `p_value` rejects at the configured level
    pub fn rejects(&self, p_value: f64) -> bool {
        p_value < self.significance_level
    }
}
