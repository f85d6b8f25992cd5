//! Flat logger: every non-empty line becomes a one-column CSV row.
//!
//! Used for raw microphone captures where the firmware prints one sample per
//! line and there is no section structure to follow.

use std::io::Write;

use anyhow::{Context, Result};
use sensordump_io::{LineSource, ReadStatus};

use crate::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerSummary {
    pub rows: usize,
    pub skipped: usize,
    pub termination: Termination,
}

pub struct LineLogger<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LineLogger<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .quote_style(csv::QuoteStyle::Necessary)
                .terminator(csv::Terminator::CRLF)
                .from_writer(out),
        }
    }

    /// Copy lines until the source closes or a stop is requested.
    /// Each row is flushed as written so an abrupt exit loses at most one line.
    pub fn run<S: LineSource>(&mut self, source: &mut S) -> Result<LoggerSummary> {
        let mut rows = 0;
        let mut skipped = 0;

        let termination = loop {
            match source.read_line().context("line source failed")? {
                ReadStatus::Line(line) if line.is_empty() => {}
                ReadStatus::Line(line) => {
                    self.writer
                        .write_record([line.as_str()])
                        .context("failed to write CSV row")?;
                    self.writer.flush().context("failed to flush CSV")?;
                    rows += 1;
                    tracing::info!("{}", line);
                }
                ReadStatus::Idle => {}
                ReadStatus::Undecodable(_) => {
                    skipped += 1;
                    tracing::warn!("Decoding error, skipping line.");
                }
                ReadStatus::Closed => break Termination::SourceClosed,
                ReadStatus::Stopped => {
                    tracing::info!("Interrupted by user. Closing serial port and file.");
                    break Termination::Stopped;
                }
            }
        };

        self.writer.flush().context("failed to flush CSV")?;
        Ok(LoggerSummary {
            rows,
            skipped,
            termination,
        })
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("failed to flush CSV: {}", e.error()))
    }
}
