//! Logging setup for the command line tool.
//!
//! The library only emits `tracing` events. The binary installs a
//! `tracing-subscriber` registry whose level comes from the `--log-level`
//! flag, `DB_SCHEMA_VIZ_LOG_LEVEL`, or `RUST_LOG` (in that order, defaulting
//! to `warn`), and whose format comes from `--log-format` or
//! `DB_SCHEMA_VIZ_LOG_FORMAT` (defaulting to `compact`).

use std::str::FromStr;

use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Install the global subscriber. Fails if one is already installed or the
/// format name is unknown.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = level
        .map(str::to_string)
        .or_else(|| std::env::var("DB_SCHEMA_VIZ_LOG_LEVEL").ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "warn".to_string());

    let format = match format
        .map(str::to_string)
        .or_else(|| std::env::var("DB_SCHEMA_VIZ_LOG_FORMAT").ok())
    {
        Some(name) => LogFormat::from_str(&name)?,
        None => LogFormat::default(),
    };

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    // Logs go to stderr so command output on stdout stays clean
    match format {
        LogFormat::Compact => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_span_events(FmtSpan::NONE),
                )
                .try_init()?;
        }
        LogFormat::Pretty => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_file(true)
                        .with_line_number(true)
                        .pretty(),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            Registry::default()
                .with(filter)
                .with(fmt::Layer::default().with_writer(std::io::stderr).json())
                .try_init()?;
        }
    }

    Ok(())
}
