use std::fmt;

use crate::Field;

#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    InvalidUtf8(String),
    MissingTimestamp,
    MissingField(Field),
    InvalidNumber {
        field: Field,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8(reason) => write!(f, "payload is not valid UTF-8: {reason}"),
            Self::MissingTimestamp => write!(f, "missing timestamp `HH:MM:SS DD-MM-YYYY`"),
            Self::MissingField(field) => write!(f, "missing field `{field}=`"),
            Self::InvalidNumber {
                field,
                value,
                reason,
            } => write!(f, "invalid value `{value}` for `{field}=`: {reason}"),
        }
    }
}

impl std::error::Error for ParseError {}
