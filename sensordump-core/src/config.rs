use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::sink::{CsvSinkFactory, DEFAULT_TIMESTAMP_FORMAT, NamingPolicy};

/// A zero timeout turns every serial read into an immediate `Idle`.
pub const MIN_READ_TIMEOUT_MS: u64 = 10;

/// Settings shared by the capture tools. Every field has a default, so an
/// empty (or missing) TOML file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Where per-sensor CSV files land.
    pub output_dir: PathBuf,
    /// chrono format string for the capture start time in file names.
    pub timestamp_format: String,
    pub naming: NamingPolicy,
    /// Serial read timeout; a timed-out read is treated as "no line yet".
    /// Values below [`MIN_READ_TIMEOUT_MS`] are raised to it.
    pub read_timeout_ms: u64,
    /// Output file of the flat line logger and the audio buffer extractor.
    pub log_file: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            naming: NamingPolicy::default(),
            read_timeout_ms: 1000,
            log_file: PathBuf::from("Audio_values_converted.csv"),
        }
    }
}

impl CaptureConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(MIN_READ_TIMEOUT_MS))
    }

    pub fn sink_factory(&self) -> CsvSinkFactory {
        CsvSinkFactory::new(&self.output_dir)
            .with_timestamp_format(&self.timestamp_format)
            .with_naming(self.naming)
    }

    pub fn log_config(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  Output dir       : {}", self.output_dir.display());
        tracing::info!("  Timestamp format : {}", self.timestamp_format);
        tracing::info!("  Naming           : {:?}", self.naming);
        tracing::info!("  Read timeout (ms): {}", self.read_timeout().as_millis());
        tracing::info!("  Log file         : {}", self.log_file.display());
    }
}
