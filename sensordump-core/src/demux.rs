//! Sectioned dump demultiplexer.
//!
//! Two-level state machine driven by prefix matches on incoming lines:
//!
//! - Idle: everything is dropped until `Dumping QSPI data`.
//! - InSession: `Reading data for sensor N` opens the section for sensor N
//!   (if registered), `Finished dumping QSPI data` ends the run, the rest is
//!   dropped.
//! - InSection: field lines become CSV rows, `Finished reading data for
//!   sensor` closes the section, the rest is dropped.
//!
//! Every loop also ends on `Closed`/`Stopped` from the line source, so there
//! is exactly one way out regardless of how the capture ends.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use sensordump_io::{LineSource, ReadStatus};

use crate::Termination;
use crate::error::DumpError;
use crate::markers::Marker;
use crate::sensor::{SensorChannel, SensorRegistry};
use crate::sink::{RecordSink, SectionTag, SinkFactory};

/// Everything one parsing run needs, scoped to that run.
#[derive(Debug)]
pub struct CaptureContext<S, F> {
    pub source: S,
    pub sinks: F,
    /// Capture start; every output name of this run derives from it.
    pub started_at: DateTime<Local>,
}

impl<S: LineSource, F: SinkFactory> CaptureContext<S, F> {
    pub fn new(source: S, sinks: F) -> Self {
        Self {
            source,
            sinks,
            started_at: Local::now(),
        }
    }

    pub fn with_started_at(mut self, started_at: DateTime<Local>) -> Self {
        self.started_at = started_at;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionSummary {
    pub sensor_id: u32,
    pub occurrence: u32,
    pub records: usize,
    pub location: PathBuf,
    /// False when the source ended or a stop arrived inside the section.
    pub closed_by_marker: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DumpSummary {
    pub termination: Termination,
    /// Whether `Dumping QSPI data` was ever seen.
    pub session_started: bool,
    pub sections: Vec<SectionSummary>,
}

impl DumpSummary {
    pub fn total_records(&self) -> usize {
        self.sections.iter().map(|s| s.records).sum()
    }

    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.sections.iter().map(|s| &s.location)
    }
}

/// How a single read step is handled by the loops below.
enum Step {
    Line(String),
    Skip,
    End(Termination),
}

fn step<S: LineSource>(source: &mut S) -> Result<Step, DumpError> {
    Ok(match source.read_line()? {
        ReadStatus::Line(line) => Step::Line(line),
        ReadStatus::Idle => Step::Skip,
        ReadStatus::Undecodable(bytes) => {
            tracing::warn!(len = bytes.len(), "Decoding error, skipping line");
            Step::Skip
        }
        ReadStatus::Closed => Step::End(Termination::SourceClosed),
        ReadStatus::Stopped => Step::End(Termination::Stopped),
    })
}

/// Splits a QSPI dump into one CSV per sensor section.
#[derive(Debug)]
pub struct DumpDemux {
    registry: SensorRegistry,
}

impl Default for DumpDemux {
    fn default() -> Self {
        Self::new(SensorRegistry::reference())
    }
}

impl DumpDemux {
    pub fn new(registry: SensorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    /// Read one dump session from `ctx.source`.
    ///
    /// Returns once the dump end marker is seen, the source closes, or a stop
    /// is requested. A malformed numeric capture, a sink failure or a hard
    /// transport error aborts the run; rows written before it stay on disk.
    pub fn run<S: LineSource, F: SinkFactory>(
        &self,
        ctx: &mut CaptureContext<S, F>,
    ) -> Result<DumpSummary, DumpError> {
        let mut summary = DumpSummary {
            termination: Termination::SourceClosed,
            session_started: false,
            sections: Vec::new(),
        };

        // Idle: wait for the dump to start
        loop {
            match step(&mut ctx.source)? {
                Step::Line(line) if Marker::classify(&line) == Some(Marker::DumpStart) => break,
                Step::Line(_) | Step::Skip => {}
                Step::End(termination) => {
                    summary.termination = termination;
                    return Ok(summary);
                }
            }
        }
        summary.session_started = true;
        tracing::info!("Data dump started");

        let mut occurrences: HashMap<u32, u32> = HashMap::new();

        // InSession
        loop {
            let line = match step(&mut ctx.source)? {
                Step::Line(line) => line,
                Step::Skip => continue,
                Step::End(termination) => {
                    tracing::warn!(?termination, "Data dump interrupted");
                    summary.termination = termination;
                    return Ok(summary);
                }
            };

            match Marker::classify(&line) {
                Some(Marker::DumpEnd) => {
                    tracing::info!("Data dump ended");
                    summary.termination = Termination::Completed;
                    return Ok(summary);
                }
                Some(Marker::SectionStart(id)) => {
                    let Some(channel) = self.registry.get(id) else {
                        tracing::debug!(sensor_id = id, "no channel for sensor, ignoring section");
                        continue;
                    };

                    let occurrence = occurrences.entry(id).or_insert(0);
                    *occurrence += 1;
                    let tag = SectionTag {
                        started_at: ctx.started_at,
                        occurrence: *occurrence,
                    };

                    let (section, end) = read_section(channel, &tag, ctx)?;
                    summary.sections.push(section);
                    if let Some(termination) = end {
                        summary.termination = termination;
                        return Ok(summary);
                    }
                }
                _ => tracing::trace!(%line, "ignored"),
            }
        }
    }
}

/// InSection: consume lines until the section end marker.
/// Returns the section summary and, if the source ended first, why.
fn read_section<S: LineSource, F: SinkFactory>(
    channel: &SensorChannel,
    tag: &SectionTag,
    ctx: &mut CaptureContext<S, F>,
) -> Result<(SectionSummary, Option<Termination>), DumpError> {
    tracing::info!("Reading {} data...", channel.label().to_lowercase());

    let mut sink = ctx.sinks.open(channel, tag)?;
    let mut section = SectionSummary {
        sensor_id: channel.id(),
        occurrence: tag.occurrence,
        records: 0,
        location: sink.location().to_path_buf(),
        closed_by_marker: false,
    };

    loop {
        let line = match step(&mut ctx.source) {
            Ok(Step::Line(line)) => line,
            Ok(Step::Skip) => continue,
            Ok(Step::End(termination)) => {
                tracing::warn!(?termination, "{} data cut short", channel.label());
                sink.finish()?;
                return Ok((section, Some(termination)));
            }
            Err(e) => return Err(release(sink, e)),
        };

        match channel.parser().parse(&line) {
            Ok(Some(record)) => {
                if let Err(e) = sink.write(&record) {
                    return Err(release(sink, e.into()));
                }
                section.records += 1;
                tracing::info!("{}: {}", channel.label(), record);
            }
            Ok(None) if Marker::classify(&line) == Some(Marker::SectionEnd) => {
                sink.finish()?;
                section.closed_by_marker = true;
                tracing::info!(records = section.records, "{} data ended", channel.label());
                return Ok((section, None));
            }
            Ok(None) => tracing::debug!(%line, "ignored"),
            Err(bad) => {
                let err = DumpError::MalformedField {
                    sensor_id: channel.id(),
                    field: bad.field,
                    text: bad.text,
                    line,
                };
                return Err(release(sink, err));
            }
        }
    }
}

/// Flush what was written so far before propagating a fatal error.
fn release(sink: Box<dyn RecordSink>, err: DumpError) -> DumpError {
    if let Err(flush_err) = sink.finish() {
        tracing::warn!(error = %flush_err, "failed to flush partial output");
    }
    err
}
