//! Delimiter lines printed by the firmware around a QSPI flash dump.
//!
//! ```text
//! Dumping QSPI data
//! Reading data for sensor 0
//!     Temperature = 21.500000
//! Finished reading data for sensor 0
//! ...
//! Finished dumping QSPI data
//! ```

pub const DUMP_START: &str = "Dumping QSPI data";
pub const DUMP_END: &str = "Finished dumping QSPI data";
pub const SECTION_START: &str = "Reading data for sensor ";
pub const SECTION_END: &str = "Finished reading data for sensor ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    DumpStart,
    DumpEnd,
    /// Start of the section for the given sensor id.
    SectionStart(u32),
    /// End of whichever section is open; the id is not checked.
    SectionEnd,
}

impl Marker {
    /// Classify an already-trimmed line by prefix. `None` for data and noise.
    pub fn classify(line: &str) -> Option<Marker> {
        if line.starts_with(DUMP_END) {
            return Some(Marker::DumpEnd);
        }
        if line.starts_with(SECTION_END) {
            return Some(Marker::SectionEnd);
        }
        if line.starts_with(DUMP_START) {
            return Some(Marker::DumpStart);
        }
        if let Some(rest) = line.strip_prefix(SECTION_START) {
            return sensor_id(rest).map(Marker::SectionStart);
        }
        None
    }
}

/// Leading decimal digits of `rest`, e.g. `"2"` or `"2 (acc)"` -> 2.
fn sensor_id(rest: &str) -> Option<u32> {
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}
