// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::adapters::toml_config::LoggingConfig;
use crate::error::{AssemblerError, AssemblerResult};

/// Build the filter: `RUST_LOG` wins when set, otherwise the configured level
pub fn build_filter(config: &LoggingConfig, rust_log: Option<&str>) -> AssemblerResult<EnvFilter> {
    let directives = rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(config.level.as_str());

    EnvFilter::try_new(directives).map_err(|e| AssemblerError::Logging {
        message: format!("Invalid filter '{}': {}", directives, e),
    })
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
pub fn init_tracing(config: &LoggingConfig) -> AssemblerResult<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(config, rust_log.as_deref())?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| AssemblerError::Logging {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_filter_uses_configured_level() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            json: false,
        };
        let filter = build_filter(&config, None).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_rust_log_overrides_level() {
        let config = LoggingConfig::default();
        let filter = build_filter(&config, Some("clip_assembler=trace")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));

        let blank = build_filter(&config, Some("  ")).unwrap();
        assert_eq!(blank.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = LoggingConfig {
            level: "clip_assembler=loud".to_string(),
            json: false,
        };
        assert!(matches!(
            build_filter(&config, None),
            Err(AssemblerError::Logging { .. })
        ));
    }
}
