use std::fmt;

#[derive(Debug)]
pub enum Error {
    MissingVariable(&'static str),
    InvalidVariable { name: &'static str, value: String },
    Mqtt(paho_mqtt::Error),
    Sheets(sheets::Error),
    Io(std::io::Error),
    Disconnected,
}

impl From<paho_mqtt::Error> for Error {
    fn from(err: paho_mqtt::Error) -> Self {
        Self::Mqtt(err)
    }
}

impl From<sheets::Error> for Error {
    fn from(err: sheets::Error) -> Self {
        Self::Sheets(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVariable(name) => write!(f, "set ENV variable {name}"),
            Self::InvalidVariable { name, value } => {
                write!(f, "invalid value {value:?} of ENV variable {name}")
            }
            Self::Mqtt(err) => write!(f, "mqtt error: {err}"),
            Self::Sheets(err) => write!(f, "sheets error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Disconnected => write!(f, "lost MQTT connection"),
        }
    }
}

impl std::error::Error for Error {}
