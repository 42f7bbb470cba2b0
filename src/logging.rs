//! # Structured Logging Module
//!
//! Environment-aware structured logging for the coordinator event loop and
//! the capture worker. Console output by default, JSON output when
//! `SNAPGUARD_LOG_FORMAT=json` is set.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let json_output = matches!(
            std::env::var("SNAPGUARD_LOG_FORMAT").as_deref(),
            Ok("json")
        );

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level.clone()));

        let result = if json_output {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_ansi(false)
                        .json()
                        .with_filter(filter),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_ansi(true)
                        .with_filter(filter),
                )
                .try_init()
        };

        // A global subscriber may already be set by the embedding process;
        // that is not an error.
        if result.is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized, continuing with existing one"
            );
        }

        tracing::info!(
            environment = %environment,
            level = %log_level,
            json = json_output,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    resolve_environment(
        std::env::var("SNAPGUARD_ENV").ok(),
        std::env::var("APP_ENV").ok(),
    )
}

fn resolve_environment(snapguard_env: Option<String>, app_env: Option<String>) -> String {
    snapguard_env
        .or(app_env)
        .unwrap_or_else(|| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}
