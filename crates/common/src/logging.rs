//! Tracing setup for the courtside binaries.
//!
//! The configured level applies to courtside's own crates. Dependencies
//! stay at `warn` unless `RUST_LOG` says otherwise.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter used when `RUST_LOG` is unset.
///
/// A bare level such as `debug` is scoped to the `courtside*` targets.
/// Anything containing a directive (`=` or `,`) is used as written.
pub fn default_directives(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else if level.is_empty() {
        "warn,courtside=info".to_string()
    } else {
        format!("warn,courtside={level}")
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let installed = if config.json {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .try_init()
    } else {
        fmt().with_env_filter(filter).with_target(false).compact().try_init()
    };

    if installed.is_ok() {
        tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_is_scoped_to_courtside() {
        assert_eq!(default_directives("debug"), "warn,courtside=debug");
        assert_eq!(default_directives(" trace "), "warn,courtside=trace");
        assert_eq!(default_directives(""), "warn,courtside=info");
    }

    #[test]
    fn test_explicit_directives_pass_through() {
        assert_eq!(default_directives("courtside_vision=trace"), "courtside_vision=trace");
        assert_eq!(default_directives("info,image=debug"), "info,image=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LoggingConfig::default();
        init_logging(&config);
        init_logging(&config);
    }
}
