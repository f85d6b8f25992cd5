use std::io::{self, BufRead, ErrorKind};

use crate::{DecodePolicy, LineSource, ReadStatus, StopFlag};

/// Splits any buffered byte stream into lines.
///
/// Works for both a capture file and a serial port wrapped in a `BufReader`:
/// a timed-out read keeps the partial line and reports [`ReadStatus::Idle`],
/// the next read continues where it left off.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
    decode: DecodePolicy,
    stop: StopFlag,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            decode: DecodePolicy::default(),
            stop: StopFlag::new(),
        }
    }

    pub fn with_decode(mut self, decode: DecodePolicy) -> Self {
        self.decode = decode;
        self
    }

    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_flag(&self) -> &StopFlag {
        &self.stop
    }

    fn finish_line(&mut self) -> ReadStatus {
        let raw = std::mem::take(&mut self.pending);
        match self.decode {
            DecodePolicy::Strict => match String::from_utf8(raw) {
                Ok(text) => ReadStatus::Line(text.trim().to_string()),
                Err(e) => ReadStatus::Undecodable(e.into_bytes()),
            },
            DecodePolicy::Lossy => ReadStatus::Line(String::from_utf8_lossy(&raw).trim().to_string()),
        }
    }
}

impl<R: BufRead> LineSource for LineReader<R> {
    fn read_line(&mut self) -> io::Result<ReadStatus> {
        if self.stop.is_raised() {
            return Ok(ReadStatus::Stopped);
        }

        match self.inner.read_until(b'\n', &mut self.pending) {
            Ok(0) => {
                // EOF; hand out a trailing line without a newline first
                if self.pending.is_empty() {
                    Ok(ReadStatus::Closed)
                } else {
                    Ok(self.finish_line())
                }
            }
            // read_until only returns without a newline at EOF; the next call reports Closed.
            Ok(_) => Ok(self.finish_line()),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                Ok(ReadStatus::Idle)
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(ReadStatus::Idle),
            Err(e) => Err(e),
        }
    }
}
