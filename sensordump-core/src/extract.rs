//! Field extractors: "parse a line into an optional Record".

use std::fmt;

use regex::Regex;

use crate::record::Record;

/// A capture that matched the pattern but is not a valid number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Zero-based position of the offending field.
    pub field: usize,
    pub text: String,
}

pub trait FieldParser: fmt::Debug + Send + Sync {
    /// Number of fields every produced record carries.
    fn arity(&self) -> usize;

    /// `Ok(None)` when the line is not a field line for this sensor.
    fn parse(&self, line: &str) -> Result<Option<Record>, FieldError>;
}

/// Unanchored regex search; each capture group is one `f64` field.
#[derive(Debug, Clone)]
pub struct RegexFieldParser {
    regex: Regex,
}

impl RegexFieldParser {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl FieldParser for RegexFieldParser {
    fn arity(&self) -> usize {
        self.regex.captures_len() - 1
    }

    fn parse(&self, line: &str) -> Result<Option<Record>, FieldError> {
        let Some(caps) = self.regex.captures(line) else {
            return Ok(None);
        };

        let mut values = Vec::with_capacity(self.arity());
        for (field, group) in caps.iter().skip(1).enumerate() {
            let text = group.map(|m| m.as_str()).unwrap_or_default();
            let value = text.parse::<f64>().map_err(|_| FieldError {
                field,
                text: text.to_string(),
            })?;
            values.push(value);
        }

        Ok(Some(Record::new(values)))
    }
}
