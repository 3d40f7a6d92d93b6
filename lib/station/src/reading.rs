use std::fmt;

use serde_json::Value;

/// Column names of the worksheet, in the order of [`SensorReading::to_row`].
pub const HEADER: [&str; 10] = [
    "Date",
    "Time",
    "Temperature",
    "Humidity",
    "WindSpeed",
    "WindDirection",
    "Pressure",
    "Rainfall",
    "Radiation",
    "Signal",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Temperature,
    Humidity,
    WindSpeed,
    WindDirection,
    Pressure,
    Rainfall,
    Radiation,
    Signal,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Temperature,
        Field::Humidity,
        Field::WindSpeed,
        Field::WindDirection,
        Field::Pressure,
        Field::Rainfall,
        Field::Radiation,
        Field::Signal,
    ];

    /// Label the station puts in front of `=` for this field.
    pub const fn label(self) -> &'static str {
        match self {
            Field::Temperature => "Temp",
            Field::Humidity => "Kelembaban",
            Field::WindSpeed => "W.Speed",
            Field::WindDirection => "W.Dir",
            Field::Pressure => "Press",
            Field::Rainfall => "Hujan",
            Field::Radiation => "Rad",
            Field::Signal => "Signal",
        }
    }

    pub(crate) const fn numeral(self) -> &'static str {
        match self {
            Field::Humidity | Field::WindDirection | Field::Signal => r"\d+",
            _ => r"[\d.]+",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Timestamp {
    /// `HH:MM:SS`
    pub time: String,
    /// `DD-MM-YYYY`
    pub date: String,
}

impl Timestamp {
    pub fn new<T: Into<String>, D: Into<String>>(time: T, date: D) -> Self {
        Self {
            time: time.into(),
            date: date.into(),
        }
    }

    pub fn key(&self) -> DedupKey {
        DedupKey::new(&self.date, &self.time)
    }
}

/// `date + " " + time` of a reading.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn new(date: &str, time: &str) -> Self {
        Self(format!("{date} {time}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SensorReading {
    pub timestamp: Option<Timestamp>,
    /// °C
    pub temperature: f64,
    /// %
    pub humidity: u32,
    /// m/s
    pub wind_speed: f64,
    /// degrees
    pub wind_direction: u32,
    /// hPa
    pub pressure: f64,
    /// mm
    pub rainfall: f64,
    /// W/m²
    pub radiation: f64,
    pub signal: u32,
}

impl SensorReading {
    pub fn key(&self) -> Option<DedupKey> {
        self.timestamp.as_ref().map(Timestamp::key)
    }

    pub fn time(&self) -> Option<&str> {
        self.timestamp.as_ref().map(|ts| ts.time.as_str())
    }

    pub fn date(&self) -> Option<&str> {
        self.timestamp.as_ref().map(|ts| ts.date.as_str())
    }

    pub fn to_row(&self) -> Vec<Value> {
        vec![
            Value::from(self.date().unwrap_or_default()),
            Value::from(self.time().unwrap_or_default()),
            Value::from(self.temperature),
            Value::from(self.humidity),
            Value::from(self.wind_speed),
            Value::from(self.wind_direction),
            Value::from(self.pressure),
            Value::from(self.rainfall),
            Value::from(self.radiation),
            Value::from(self.signal),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reading() -> SensorReading {
        SensorReading {
            timestamp: Some(Timestamp::new("12:30:00", "01-01-2025")),
            temperature: 25.5,
            humidity: 60,
            wind_speed: 1.2,
            wind_direction: 180,
            pressure: 1012.3,
            rainfall: 0.0,
            radiation: 300.0,
            signal: 90,
        }
    }

    #[test]
    fn test_key_is_date_then_time() {
        let key = reading().key().unwrap();
        assert_eq!(key.as_str(), "01-01-2025 12:30:00");
        assert_eq!(key, DedupKey::new("01-01-2025", "12:30:00"));
    }

    #[test]
    fn test_row_follows_header_order() {
        let row = reading().to_row();

        assert_eq!(row.len(), HEADER.len());
        assert_eq!(
            row,
            vec![
                json!("01-01-2025"),
                json!("12:30:00"),
                json!(25.5),
                json!(60),
                json!(1.2),
                json!(180),
                json!(1012.3),
                json!(0.0),
                json!(300.0),
                json!(90),
            ]
        );
    }

    #[test]
    fn test_reading_without_timestamp_has_no_key() {
        let reading = SensorReading {
            timestamp: None,
            ..reading()
        };

        assert_eq!(reading.key(), None);
        assert_eq!(reading.time(), None);
        assert_eq!(reading.to_row()[0], json!(""));
    }

    #[test]
    fn test_field_labels() {
        let labels: Vec<_> = Field::ALL.iter().map(|f| f.to_string()).collect();
        assert_eq!(
            labels,
            ["Temp", "Kelembaban", "W.Speed", "W.Dir", "Press", "Hujan", "Rad", "Signal"]
        );
    }
}
