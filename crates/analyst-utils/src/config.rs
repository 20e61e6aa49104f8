//! Runtime settings for analysis runs

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Tunable knobs for one analysis process
///
/// Timeouts and retry budgets apply per stage attempt; the defaults match
/// the pipeline contract (3 attempts, exponential backoff).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Total attempts per stage, including the first
    pub max_attempts: u32,

    /// Time budget for a single stage attempt
    pub stage_timeout: Duration,

    /// Initial backoff between retries; doubles per retry
    pub retry_backoff_base: Duration,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            stage_timeout: Duration::from_secs(30),
            retry_backoff_base: Duration::from_millis(100),
        }
    }
}

impl AnalysisSettings {
    /// Load settings, letting environment variables override defaults
    ///
    /// Recognized variables: `ANALYST_MAX_ATTEMPTS`,
    /// `ANALYST_STAGE_TIMEOUT_SECS`, `ANALYST_RETRY_BACKOFF_MS`.
    pub fn from_env() -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Ok(raw) = std::env::var("ANALYST_MAX_ATTEMPTS") {
            settings.max_attempts = raw
                .parse()
                .map_err(|_| SettingsError::Invalid(format!("ANALYST_MAX_ATTEMPTS={raw}")))?;
        }
        if let Ok(raw) = std::env::var("ANALYST_STAGE_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .map_err(|_| SettingsError::Invalid(format!("ANALYST_STAGE_TIMEOUT_SECS={raw}")))?;
            settings.stage_timeout = Duration::from_secs(secs);
        }
        if let Ok(raw) = std::env::var("ANALYST_RETRY_BACKOFF_MS") {
            let millis: u64 = raw
                .parse()
                .map_err(|_| SettingsError::Invalid(format!("ANALYST_RETRY_BACKOFF_MS={raw}")))?;
            settings.retry_backoff_base = Duration::from_millis(millis);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_attempts == 0 {
            return Err(SettingsError::Invalid(
                "max_attempts must be greater than 0".to_string(),
            ));
        }
        if self.stage_timeout.is_zero() {
            return Err(SettingsError::Invalid(
                "stage_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
