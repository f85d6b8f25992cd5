//! Audio buffer extraction from a debugger variable dump.
//!
//! The IDE's "copy expressions" output lists one element per line, e.g.
//! `audioBufferLeft[12]  int32_t  -1834`. Both channels are collected in
//! order, cut to the shorter length and written side by side.

use std::io::{BufRead, Write};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

pub const LEFT_HEADER: &str = "audioBufferLeft";
pub const RIGHT_HEADER: &str = "audioBufferRight";

static LEFT_REGEX: OnceLock<Regex> = OnceLock::new();
static RIGHT_REGEX: OnceLock<Regex> = OnceLock::new();

fn left_regex() -> &'static Regex {
    LEFT_REGEX.get_or_init(|| {
        Regex::new(r"audioBufferLeft\[\d+\]\s+int32_t\s+(-?\d+)").expect("Invalid left buffer Regex")
    })
}

fn right_regex() -> &'static Regex {
    RIGHT_REGEX.get_or_init(|| {
        Regex::new(r"audioBufferRight\[\d+\]\s+int32_t\s+(-?\d+)")
            .expect("Invalid right buffer Regex")
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioBuffers {
    pub left: Vec<i64>,
    pub right: Vec<i64>,
}

impl AudioBuffers {
    /// Scan every line; a line may contribute to both channels.
    pub fn extract<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut buffers = Self::default();
        let mut raw = Vec::new();
        let mut line_no = 0usize;

        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw).context("failed to read dump")? == 0 {
                break;
            }
            line_no += 1;
            let line = String::from_utf8_lossy(&raw);

            if let Some(caps) = left_regex().captures(&line) {
                buffers.left.push(
                    caps[1]
                        .parse::<i64>()
                        .with_context(|| format!("line {line_no}: bad left sample {:?}", &caps[1]))?,
                );
            }
            if let Some(caps) = right_regex().captures(&line) {
                buffers.right.push(
                    caps[1]
                        .parse::<i64>()
                        .with_context(|| format!("line {line_no}: bad right sample {:?}", &caps[1]))?,
                );
            }
        }

        Ok(buffers)
    }

    /// Sample pairs, truncated to the shorter channel.
    pub fn pairs(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.left.iter().copied().zip(self.right.iter().copied())
    }

    /// Write the header plus one row per pair; returns the row count.
    pub fn write_csv<W: Write>(&self, out: W) -> Result<usize> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(out);
        writer
            .write_record([LEFT_HEADER, RIGHT_HEADER])
            .context("failed to write CSV header")?;

        let mut rows = 0;
        for (left, right) in self.pairs() {
            writer
                .write_record([left.to_string(), right.to_string()])
                .context("failed to write CSV row")?;
            rows += 1;
        }
        writer.flush().context("failed to flush CSV")?;
        Ok(rows)
    }
}
