use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions that end a dump run.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The field pattern matched but a capture is not a number. The capture
    /// (or the pattern) is broken; continuing would write wrong data.
    #[error("sensor {sensor_id}: field {field} is not a number ({text:?}) in line {line:?}")]
    MalformedField {
        sensor_id: u32,
        field: usize,
        text: String,
        line: String,
    },

    #[error("sensor {sensor_id}: {fields} field(s) extracted but {headers} header(s) declared")]
    Arity {
        sensor_id: u32,
        fields: usize,
        headers: usize,
    },

    #[error("line source failed: {0}")]
    Source(#[from] io::Error),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: record has {got} field(s), expected {expected}", path.display())]
    Width {
        path: PathBuf,
        expected: usize,
        got: usize,
    },

    #[error("invalid timestamp format {0:?}")]
    TimestampFormat(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
