use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serialport::SerialPort;

use crate::{DecodePolicy, LineReader, StopFlag};

/// Serial-backed line source.
pub type SerialLineSource = LineReader<BufReader<Box<dyn SerialPort>>>;

/// File-backed line source, used to replay a captured debug log.
pub type FileLineSource = LineReader<BufReader<File>>;

/// Configuration for a Serial Connection
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub port_name: String,
    pub baud_rate: u32,
    /// How long a single read may block before reporting `Idle`.
    pub read_timeout: Duration,
    pub decode: DecodePolicy,
}

impl SerialConfig {
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            read_timeout: Duration::from_secs(1),
            decode: DecodePolicy::Strict,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_decode(mut self, decode: DecodePolicy) -> Self {
        self.decode = decode;
        self
    }

    /// Open the port and wrap it as a line source observing `stop`.
    pub fn open(&self, stop: StopFlag) -> anyhow::Result<SerialLineSource> {
        let port = serialport::new(&self.port_name, self.baud_rate)
            .timeout(self.read_timeout)
            .open()
            .with_context(|| format!("Failed to open {} at {} baud", self.port_name, self.baud_rate))?;

        tracing::info!(port = %self.port_name, baud = self.baud_rate, "serial port open");

        Ok(LineReader::new(BufReader::new(port))
            .with_decode(self.decode)
            .with_stop_flag(stop))
    }
}

/// Open a captured log file as a line source.
pub fn open_capture_file(
    path: &Path,
    decode: DecodePolicy,
    stop: StopFlag,
) -> anyhow::Result<FileLineSource> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(LineReader::new(BufReader::new(file))
        .with_decode(decode)
        .with_stop_flag(stop))
}
