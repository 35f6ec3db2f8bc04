//! Log level selection and subscriber setup.
//!
//! Logs go to stderr so `--print` output on stdout stays clean.

use anyhow::Result;
use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Levels accepted by `--log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    /// Same as `error`; there is no more severe tracing level.
    Critical,
}

impl LogLevel {
    pub fn as_tracing(self) -> Level {
        match self {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warning => Level::WARN,
            LogLevel::Error | LogLevel::Critical => Level::ERROR,
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init(level: LogLevel) -> Result<()> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.is_empty() => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(EnvFilter::new(directives))
                .with_writer(std::io::stderr)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        _ => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level.as_tracing())
                .with_writer(std::io::stderr)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogLevel::Warning.as_tracing(), Level::WARN);
        assert_eq!(LogLevel::Critical.as_tracing(), Level::ERROR);
    }

    #[test]
    fn test_level_parses_from_cli_value() {
        assert_eq!(LogLevel::from_str("warning", true).unwrap(), LogLevel::Warning);
        assert_eq!(LogLevel::from_str("DEBUG", true).unwrap(), LogLevel::Debug);
        assert!(LogLevel::from_str("verbose", true).is_err());
    }
}
