use std::fmt;

/// One parsed measurement: a scalar or a vector of `f64` fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<f64>,
}

impl Record {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// CSV cells for this record.
    pub fn fields(&self) -> impl Iterator<Item = String> + '_ {
        self.values.iter().map(|v| render_field(*v))
    }
}

/// Shortest round-trip decimal form that keeps `.0` on integral values
/// (`1.0`, `-3.25`, `21.5`). Never switches to exponent notation, so
/// `0.000001` stays `0.000001`.
pub fn render_field(value: f64) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.values.as_slice() {
            [single] => write!(f, "{}", render_field(*single)),
            many => {
                let parts: Vec<String> = many.iter().map(|v| render_field(*v)).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}
