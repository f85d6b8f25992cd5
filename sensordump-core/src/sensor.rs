use crate::error::DumpError;
use crate::extract::{FieldParser, RegexFieldParser};

/// A captured number as the firmware prints it: digits, dots and minus signs.
/// Anything the class admits but `f64` rejects is a fatal capture error.
const NUM: &str = r"([\d.\-]+)";

/// Everything needed to turn one sensor's section into a CSV file.
#[derive(Debug)]
pub struct SensorChannel {
    id: u32,
    label: String,
    file_stem: String,
    headers: Vec<String>,
    parser: Box<dyn FieldParser>,
}

impl SensorChannel {
    /// Fails when the parser's arity does not match the header count.
    pub fn new(
        id: u32,
        label: impl Into<String>,
        file_stem: impl Into<String>,
        headers: Vec<String>,
        parser: Box<dyn FieldParser>,
    ) -> Result<Self, DumpError> {
        if parser.arity() != headers.len() {
            return Err(DumpError::Arity {
                sensor_id: id,
                fields: parser.arity(),
                headers: headers.len(),
            });
        }
        Ok(Self {
            id,
            label: label.into(),
            file_stem: file_stem.into(),
            headers,
            parser,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Human-readable name used in progress output ("Temperature").
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Prefix of the output file name ("temp_data").
    pub fn file_stem(&self) -> &str {
        &self.file_stem
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn parser(&self) -> &dyn FieldParser {
        self.parser.as_ref()
    }
}

/// Sensor id -> channel lookup. Ids outside the registry are ignored by the
/// demultiplexer.
#[derive(Debug, Default)]
pub struct SensorRegistry {
    channels: Vec<SensorChannel>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four sensors the board dumps from QSPI flash.
    pub fn reference() -> Self {
        let mut registry = Self::new();
        for (id, label, stem, token, headers) in [
            (
                0,
                "Temperature",
                "temp_data",
                format!("Temperature = {NUM}"),
                vec!["Temperature (Celsius)"],
            ),
            (
                1,
                "Humidity",
                "hum_data",
                format!("Humidity = {NUM}"),
                vec!["Humidity (%)"],
            ),
            (
                2,
                "Acceleration",
                "acc_data",
                format!("Accelerometer x = {NUM}, y = {NUM}, z = {NUM}"),
                vec![
                    "Acceleration X (m/s^2)",
                    "Acceleration Y (m/s^2)",
                    "Acceleration Z (m/s^2)",
                ],
            ),
            (
                3,
                "Gyroscope",
                "gyro_data",
                format!("Gyroscope x = {NUM}, y = {NUM}, z = {NUM}"),
                vec![
                    "Gyroscope X (deg/s)",
                    "Gyroscope Y (deg/s)",
                    "Gyroscope Z (deg/s)",
                ],
            ),
        ] {
            let parser = RegexFieldParser::new(&token).expect("Invalid sensor Regex");
            registry.channels.push(SensorChannel {
                id,
                label: label.to_string(),
                file_stem: stem.to_string(),
                headers: headers.into_iter().map(String::from).collect(),
                parser: Box::new(parser),
            });
        }
        registry
    }

    /// Add a channel, replacing any existing one with the same id.
    pub fn register(&mut self, channel: SensorChannel) {
        self.channels.retain(|c| c.id != channel.id);
        self.channels.push(channel);
        self.channels.sort_by_key(|c| c.id);
    }

    pub fn get(&self, id: u32) -> Option<&SensorChannel> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.channels.iter().map(|c| c.id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
