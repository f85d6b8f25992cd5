pub mod buffer_extract;
pub mod config;
pub mod demux;
pub mod error;
pub mod extract;
pub mod line_logger;
pub mod markers;
pub mod record;
pub mod sensor;
pub mod sink;

// Re-export the main entry points so users can just use `sensordump_core::DumpDemux`
pub use config::CaptureConfig;
pub use demux::{CaptureContext, DumpDemux, DumpSummary, SectionSummary};
pub use error::{ConfigError, DumpError, SinkError};
pub use record::Record;
pub use sensor::{SensorChannel, SensorRegistry};
pub use sink::{CsvSinkFactory, NamingPolicy, RecordSink, SectionTag, SinkFactory};

/// Why a read loop (dump, flat log) stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The "dump end" marker was seen.
    Completed,
    /// The line source ran dry before a terminal marker.
    SourceClosed,
    /// A stop was requested (Ctrl+C).
    Stopped,
}
