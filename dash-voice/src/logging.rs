//! Logging setup for the dash-voice binary
//!
//! The library crates only emit `tracing` events; this module decides where
//! they go.

use std::str::FromStr;

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable overriding the filter directive
pub const LOG_LEVEL_ENV: &str = "DASH_VOICE_LOG_LEVEL";

/// Environment variable selecting the [`LoggingMode`]
pub const LOG_MODE_ENV: &str = "DASH_VOICE_LOG_MODE";

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingMode {
    /// No output
    Silent,
    /// Compact stderr output, `info` by default
    #[default]
    Development,
    /// Verbose output with source locations, `debug` by default
    Debug,
}

impl LoggingMode {
    fn default_level(self) -> &'static str {
        match self {
            LoggingMode::Silent => "off",
            LoggingMode::Development => "info",
            LoggingMode::Debug => "debug",
        }
    }
}

impl FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(LoggingMode::Silent),
            "development" | "dev" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            other => Err(LoggingError::InvalidEnv(format!(
                "{}={} (expected silent, development or debug)",
                LOG_MODE_ENV, other
            ))),
        }
    }
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),

    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },
}

/// Initialize logging with the specified mode.
///
/// `level` comes from the command line and wins over the environment. Without
/// it the filter is taken from `DASH_VOICE_LOG_LEVEL`, then `RUST_LOG`, then
/// the mode's default level.
pub fn init_logging(mode: LoggingMode, level: Option<&str>) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    if mode == LoggingMode::Silent {
        return Ok(());
    }

    let directive = resolve_directive(
        level,
        std::env::var(LOG_LEVEL_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
        mode.default_level(),
    );
    let filter = create_env_filter(&directive)?;

    match mode {
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .pretty()
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init(),
        _ => Registry::default()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .with(filter)
            .try_init(),
    }
    .map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Mode named by `DASH_VOICE_LOG_MODE`, `Development` when unset
pub fn mode_from_env() -> Result<LoggingMode, LoggingError> {
    match std::env::var(LOG_MODE_ENV) {
        Ok(mode) => mode.parse(),
        Err(_) => Ok(LoggingMode::default()),
    }
}

/// Pick the first non-blank filter directive in precedence order
fn resolve_directive(
    cli: Option<&str>,
    dash_voice_env: Option<String>,
    rust_log: Option<String>,
    default_level: &str,
) -> String {
    cli.map(str::to_string)
        .into_iter()
        .chain(dash_voice_env)
        .chain(rust_log)
        .map(|directive| directive.trim().to_string())
        .find(|directive| !directive.is_empty())
        .unwrap_or_else(|| default_level.to_string())
}

fn create_env_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent, None).is_ok());
    }

    #[rstest]
    #[case("silent", LoggingMode::Silent)]
    #[case("Development", LoggingMode::Development)]
    #[case(" debug ", LoggingMode::Debug)]
    fn test_mode_parsing(#[case] raw: &str, #[case] expected: LoggingMode) {
        assert_eq!(raw.parse::<LoggingMode>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = "loud".parse::<LoggingMode>().unwrap_err();
        assert!(err.to_string().contains("DASH_VOICE_LOG_MODE=loud"));
    }

    #[test]
    fn test_directive_precedence() {
        let env = || Some("warn".to_string());
        let rust_log = || Some("trace".to_string());

        assert_eq!(resolve_directive(Some("debug"), env(), rust_log(), "info"), "debug");
        assert_eq!(resolve_directive(None, env(), rust_log(), "info"), "warn");
        assert_eq!(resolve_directive(None, None, rust_log(), "info"), "trace");
        assert_eq!(resolve_directive(None, Some("  ".to_string()), None, "info"), "info");
    }

    #[test]
    fn test_invalid_filter() {
        assert!(matches!(
            create_env_filter("dash_events=notalevel"),
            Err(LoggingError::InvalidFilter { .. })
        ));
    }
}
