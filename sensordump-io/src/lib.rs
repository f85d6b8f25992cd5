//! # Sensordump IO
//!
//! The Line Source layer.
//! Turns a serial port or a captured debug log into a stream of trimmed text
//! lines, one blocking read at a time. Every read reports an explicit
//! [`ReadStatus`] so callers have a single exit path for timeouts, decode
//! problems, end of stream and Ctrl+C.

pub mod reader;
pub mod serial;

pub use reader::LineReader;
pub use serial::{FileLineSource, SerialConfig, SerialLineSource, open_capture_file};

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of a single read step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStatus {
    /// A complete line, surrounding whitespace (and the `\n\r` the firmware
    /// prints) already stripped. May be empty.
    Line(String),
    /// The read timed out before a full line arrived. Not a boundary.
    Idle,
    /// A line arrived but was not valid UTF-8 (strict decoding only).
    Undecodable(Vec<u8>),
    /// The source has no more data.
    Closed,
    /// A stop was requested through the [`StopFlag`].
    Stopped,
}

impl ReadStatus {
    /// True for the statuses that end a read loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReadStatus::Closed | ReadStatus::Stopped)
    }
}

/// How raw bytes become text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Invalid UTF-8 yields [`ReadStatus::Undecodable`].
    #[default]
    Strict,
    /// Invalid sequences are replaced with U+FFFD.
    Lossy,
}

/// Anything that can hand out lines one blocking read at a time.
pub trait LineSource {
    /// Blocks until a line, a timeout, the end of the stream or a stop request.
    /// Only unrecoverable transport failures surface as `Err`.
    fn read_line(&mut self) -> io::Result<ReadStatus>;
}

impl<T: LineSource + ?Sized> LineSource for &mut T {
    fn read_line(&mut self) -> io::Result<ReadStatus> {
        (**self).read_line()
    }
}

impl<T: LineSource + ?Sized> LineSource for Box<T> {
    fn read_line(&mut self) -> io::Result<ReadStatus> {
        (**self).read_line()
    }
}

/// Shared "please stop" signal, raised from a Ctrl+C handler and observed by
/// the reading thread on its next read.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
