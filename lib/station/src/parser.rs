use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

use log::trace;
use regex::Regex;

use crate::{Field, ParseError, Result, SensorReading, Timestamp};

/// What to do with a message that carries no `HH:MM:SS DD-MM-YYYY` stamp.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// The message is rejected with [`ParseError::MissingTimestamp`].
    #[default]
    Required,
    /// The reading is accepted without a timestamp. It has no dedup key and
    /// is never persisted.
    Optional,
}

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2}:\d{2}:\d{2}) (\d{2}-\d{2}-\d{4})").expect("invalid timestamp regex")
});

static PATTERNS: LazyLock<[Pattern; 8]> = LazyLock::new(|| Field::ALL.map(Pattern::new));

struct Pattern {
    value: Regex,
    label: Regex,
}

impl Pattern {
    fn new(field: Field) -> Self {
        let label = regex::escape(field.label());
        let numeral = field.numeral();

        Self {
            value: Regex::new(&format!(r"{label}\s*=\s*({numeral})")).expect("invalid field regex"),
            label: Regex::new(&format!(r"{label}\s*=\s*?(\S*)")).expect("invalid label regex"),
        }
    }
}

pub fn parse_payload(payload: &[u8], policy: TimestampPolicy) -> Result<SensorReading> {
    let text =
        std::str::from_utf8(payload).map_err(|err| ParseError::InvalidUtf8(err.to_string()))?;
    parse(text, policy)
}

pub fn parse(text: &str, policy: TimestampPolicy) -> Result<SensorReading> {
    let timestamp = TIMESTAMP
        .captures(text)
        .map(|captures| Timestamp::new(&captures[1], &captures[2]));

    if timestamp.is_none() && policy == TimestampPolicy::Required {
        return Err(ParseError::MissingTimestamp);
    }

    let reading = SensorReading {
        timestamp,
        temperature: extract(text, Field::Temperature)?,
        humidity: extract(text, Field::Humidity)?,
        wind_speed: extract(text, Field::WindSpeed)?,
        wind_direction: extract(text, Field::WindDirection)?,
        pressure: extract(text, Field::Pressure)?,
        rainfall: extract(text, Field::Rainfall)?,
        radiation: extract(text, Field::Radiation)?,
        signal: extract(text, Field::Signal)?,
    };

    trace!("parsed {reading:?}");

    Ok(reading)
}

fn extract<T>(text: &str, field: Field) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let pattern = &PATTERNS[field as usize];

    if let Some(captures) = pattern.value.captures(text) {
        let value = &captures[1];

        return value.parse().map_err(|err: T::Err| ParseError::InvalidNumber {
            field,
            value: value.to_owned(),
            reason: err.to_string(),
        });
    }

    // the label is there, but not followed by a plain numeral
    let captures = pattern
        .label
        .captures(text)
        .ok_or(ParseError::MissingField(field))?;
    let value = &captures[1];

    let reason = match value.parse::<T>() {
        Err(err) => err.to_string(),
        Ok(_) => "unsupported numeral format".to_owned(),
    };

    Err(ParseError::InvalidNumber {
        field,
        value: value.to_owned(),
        reason,
    })
}
