//! Structured logging.
//!
//! `LoggingConfig` is the only place the process-wide subscriber is
//! described. Third-party noise is quieted with filter directives here,
//! not with per-call overrides elsewhere.
//!
//! `RUST_LOG`, when set, replaces the configured level and directives.

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Crates whose info-level chatter drowns out ours.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "alloy_transport_http=warn", "reqwest=warn"];

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines for local development.
    Pretty,
    /// Newline-delimited JSON for log aggregation.
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Process-wide logging configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub directives: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directives: QUIET_TARGETS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl LoggingConfig {
    pub fn from_observability(config: &ObservabilityConfig) -> Self {
        Self {
            level: config.log_level.clone(),
            format: LogFormat::parse(&config.log_format).unwrap_or(LogFormat::Pretty),
            ..Self::default()
        }
    }

    /// Filter string handed to `EnvFilter` when `RUST_LOG` is absent.
    pub fn filter_spec(&self) -> String {
        std::iter::once(self.level.as_str())
            .chain(self.directives.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.filter_spec()))
    }
}

fn build_subscriber(config: &LoggingConfig) -> Box<dyn tracing::Subscriber + Send + Sync> {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    match config.format {
        LogFormat::Pretty => Box::new(registry.with(fmt::layer().with_target(true))),
        LogFormat::Json => Box::new(registry.with(fmt::layer().json().with_target(true))),
    }
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed; the existing one
/// is kept, so calling this twice is harmless.
pub fn init_logging(config: &LoggingConfig) -> bool {
    tracing::subscriber::set_global_default(build_subscriber(config)).is_ok()
}
