//! Per-section CSV output.
//!
//! A [`SinkFactory`] is asked for a fresh [`RecordSink`] every time a sensor
//! section is entered. The CSV factory names files after the sensor and the
//! capture start time; [`NamingPolicy`] decides what happens when the same
//! sensor shows up twice in one dump.

use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::error::SinkError;
use crate::record::Record;
use crate::sensor::SensorChannel;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Identifies one section entry within a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTag {
    pub started_at: DateTime<Local>,
    /// 1 for the first section of this sensor in the dump, 2 for the next...
    pub occurrence: u32,
}

pub trait RecordSink {
    fn write(&mut self, record: &Record) -> Result<(), SinkError>;

    /// Flush and release the destination.
    fn finish(self: Box<Self>) -> Result<(), SinkError>;

    fn location(&self) -> &Path;
}

pub trait SinkFactory {
    fn open(
        &mut self,
        channel: &SensorChannel,
        tag: &SectionTag,
    ) -> Result<Box<dyn RecordSink>, SinkError>;
}

impl<F: SinkFactory + ?Sized> SinkFactory for &mut F {
    fn open(
        &mut self,
        channel: &SensorChannel,
        tag: &SectionTag,
    ) -> Result<Box<dyn RecordSink>, SinkError> {
        (**self).open(channel, tag)
    }
}

/// What to do when a sensor's section appears more than once in a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingPolicy {
    /// `temp_data_<ts>.csv`, then `temp_data_<ts>_2.csv`, ...
    #[default]
    Numbered,
    /// Every occurrence truncates the same file; only the last survives.
    Overwrite,
    /// Later occurrences append rows to the first file, header written once.
    Append,
}

#[derive(Debug, Clone)]
pub struct CsvSinkFactory {
    output_dir: PathBuf,
    timestamp_format: String,
    naming: NamingPolicy,
}

impl CsvSinkFactory {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            naming: NamingPolicy::default(),
        }
    }

    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the sink for this section entry writes to.
    pub fn path_for(&self, channel: &SensorChannel, tag: &SectionTag) -> Result<PathBuf, SinkError> {
        let mut stamp = String::new();
        write!(stamp, "{}", tag.started_at.format(&self.timestamp_format))
            .map_err(|_| SinkError::TimestampFormat(self.timestamp_format.clone()))?;

        let name = match self.naming {
            NamingPolicy::Numbered if tag.occurrence > 1 => {
                format!("{}_{}_{}.csv", channel.file_stem(), stamp, tag.occurrence)
            }
            _ => format!("{}_{}.csv", channel.file_stem(), stamp),
        };
        Ok(self.output_dir.join(name))
    }
}

impl SinkFactory for CsvSinkFactory {
    fn open(
        &mut self,
        channel: &SensorChannel,
        tag: &SectionTag,
    ) -> Result<Box<dyn RecordSink>, SinkError> {
        let path = self.path_for(channel, tag)?;
        let append = self.naming == NamingPolicy::Append;

        let sink = CsvSink::create(path, channel.headers(), append)?;
        tracing::debug!(path = %sink.location().display(), append, "csv sink open");
        Ok(Box::new(sink))
    }
}

/// Comma-delimited, minimal quoting, header row first.
pub struct CsvSink {
    path: PathBuf,
    width: usize,
    writer: csv::Writer<File>,
}

impl CsvSink {
    pub fn create(path: PathBuf, headers: &[String], append: bool) -> Result<Self, SinkError> {
        let wrap = |path: &Path, source: csv::Error| SinkError::Csv {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| wrap(&path, e.into()))?;
        }

        let file = if append {
            OpenOptions::new().create(true).append(true).open(&path)
        } else {
            File::create(&path)
        }
        .map_err(|e| wrap(&path, e.into()))?;

        let fresh = file.metadata().map(|m| m.len() == 0).unwrap_or(true);

        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::CRLF)
            .from_writer(file);

        if fresh {
            writer.write_record(headers).map_err(|e| wrap(&path, e))?;
        }

        Ok(Self {
            path,
            width: headers.len(),
            writer,
        })
    }
}

impl RecordSink for CsvSink {
    fn write(&mut self, record: &Record) -> Result<(), SinkError> {
        if record.len() != self.width {
            return Err(SinkError::Width {
                path: self.path.clone(),
                expected: self.width,
                got: record.len(),
            });
        }
        self.writer
            .write_record(record.fields())
            .map_err(|source| SinkError::Csv {
                path: self.path.clone(),
                source,
            })
    }

    fn finish(mut self: Box<Self>) -> Result<(), SinkError> {
        self.writer.flush().map_err(|e| SinkError::Csv {
            path: self.path.clone(),
            source: e.into(),
        })
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
