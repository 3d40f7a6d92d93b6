mod error;
mod parser;
mod reading;

pub use error::ParseError;
pub use parser::{parse, parse_payload, TimestampPolicy};
pub use reading::{DedupKey, Field, SensorReading, Timestamp, HEADER};

pub type Result<T> = std::result::Result<T, ParseError>;
