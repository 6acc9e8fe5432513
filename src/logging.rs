//! Subscriber setup for programs embedding powerrs
//!
//! The library only emits `tracing` events. A program that wants them on
//! screen, or in a file, reads the `[logging]` table of its powerrs TOML file
//! into [`LogSettings`] and calls [`init_logging`] once at startup.

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{PowerRsError, Result};
use crate::import::read_error;

/// Console output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl FromStr for LogFormat {
    type Err = PowerRsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(PowerRsError::Configuration(format!(
                "Unknown log format '{}'",
                other
            ))),
        }
    }
}

/// `[logging]` table of the powerrs configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set
    pub filter: String,

    pub format: LogFormat,

    /// Also append JSON lines to this file
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "powerrs=info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LoggingFile {
    #[serde(default)]
    logging: LogSettings,
}

impl LogSettings {
    /// Read the `[logging]` table; other tables such as `[calculation]` are ignored
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: LoggingFile = toml::from_str(content)
            .map_err(|e| PowerRsError::Configuration(format!("Invalid TOML: {}", e)))?;
        file.logging.parse_filter()?;
        Ok(file.logging)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| read_error(path, e))?;
        Self::from_toml_str(&content)
    }

    fn parse_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.filter).map_err(|e| {
            PowerRsError::Configuration(format!("Invalid log filter '{}': {}", self.filter, e))
        })
    }
}

/// Install the global subscriber
///
/// When a log file is configured the returned guard owns its writer thread;
/// keep it alive until exit, dropping it flushes pending lines. Fails if a
/// global subscriber is already installed.
pub fn init_logging(settings: &LogSettings) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => settings.parse_filter()?,
    };

    let console = match settings.format {
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
    };

    let (file_layer, guard) = match &settings.file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| PowerRsError::Configuration(format!("Cannot install subscriber: {}", e)))?;

    tracing::debug!(format = ?settings.format, file = ?settings.file, "logging ready");
    Ok(guard)
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    let open_error = |e: std::io::Error| {
        PowerRsError::Configuration(format!("Cannot open log file {}: {}", path.display(), e))
    };

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(open_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Compact ".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(PowerRsError::Configuration(_))
        ));
    }

    #[test]
    fn test_logging_table_shares_the_config_file() {
        let settings = LogSettings::from_toml_str(
            r#"
            [calculation]
            np_window_seconds = 10

            [logging]
            filter = "powerrs=debug"
            format = "json"
            file = "logs/powerrs.log"
            "#,
        )
        .unwrap();

        assert_eq!(settings.filter, "powerrs=debug");
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.file, Some(PathBuf::from("logs/powerrs.log")));
    }

    #[test]
    fn test_missing_table_uses_defaults() {
        let settings = LogSettings::from_toml_str("[calculation]\n").unwrap();
        assert_eq!(settings, LogSettings::default());

        let settings = LogSettings::from_toml_str("[logging]\nformat = \"compact\"\n").unwrap();
        assert_eq!(settings.filter, "powerrs=info");
        assert_eq!(settings.format, LogFormat::Compact);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let result = LogSettings::from_toml_str("[logging]\nformat = \"xml\"\n");
        assert!(matches!(result, Err(PowerRsError::Configuration(_))));

        let result = LogSettings::from_toml_str("[logging]\nfilter = \"powerrs=loud\"\n");
        match result {
            Err(PowerRsError::Configuration(message)) => {
                assert!(message.contains("powerrs=loud"))
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = LogSettings::load(Path::new("does_not_exist.toml"));
        assert!(matches!(
            result,
            Err(PowerRsError::Parse(crate::error::ParseError::FileNotFound { .. }))
        ));
    }
}
