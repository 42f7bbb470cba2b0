use crate::error::{Result, SnapguardError};
use std::time::Duration;

/// Runtime configuration for the snapshot coordinator.
#[derive(Debug, Clone)]
pub struct SnapguardConfig {
    /// Number of retries after the first failed capture attempt.
    /// Zero restores strict fail-fast behavior.
    pub retry_limit: u32,
    /// Base delay for exponential capture retry backoff.
    pub backoff_base_ms: u64,
    /// Upper bound on a single backoff delay.
    pub backoff_max_ms: u64,
    /// Budget for the shutdown drain, covering both the in-flight capture
    /// and the mandatory final one.
    pub drain_timeout_ms: u64,
}

impl Default for SnapguardConfig {
    fn default() -> Self {
        Self {
            retry_limit: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 30_000,
            drain_timeout_ms: 30_000,
        }
    }
}

impl SnapguardConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(retry_limit) = std::env::var("SNAPGUARD_RETRY_LIMIT") {
            config.retry_limit = retry_limit.parse().map_err(|e| {
                SnapguardError::Configuration {
                    message: format!("Invalid retry_limit: {e}"),
                }
            })?;
        }

        if let Ok(base) = std::env::var("SNAPGUARD_BACKOFF_BASE_MS") {
            config.backoff_base_ms = base.parse().map_err(|e| {
                SnapguardError::Configuration {
                    message: format!("Invalid backoff_base_ms: {e}"),
                }
            })?;
        }

        if let Ok(max) = std::env::var("SNAPGUARD_BACKOFF_MAX_MS") {
            config.backoff_max_ms = max.parse().map_err(|e| {
                SnapguardError::Configuration {
                    message: format!("Invalid backoff_max_ms: {e}"),
                }
            })?;
        }

        if let Ok(timeout) = std::env::var("SNAPGUARD_DRAIN_TIMEOUT_MS") {
            config.drain_timeout_ms = timeout.parse().map_err(|e| {
                SnapguardError::Configuration {
                    message: format!("Invalid drain_timeout_ms: {e}"),
                }
            })?;
        }

        Ok(config)
    }

    /// Exponential backoff delay for the given retry attempt (zero-based),
    /// capped at `backoff_max_ms`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let multiplier = 2u64.saturating_pow(attempt);
        let delay_ms = self
            .backoff_base_ms
            .saturating_mul(multiplier)
            .min(self.backoff_max_ms);
        Duration::from_millis(delay_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}
