use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Form(serde_urlencoded::ser::Error),
    Url(url::ParseError),
    Http(hyper::Error),
    Request(hyper::http::Error),
    Token(jsonwebtoken::errors::Error),
    Status { status: u16, body: String },
    SpreadsheetNotFound(String),
    NoWorksheet(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Self::Form(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err)
    }
}

impl From<hyper::Error> for Error {
    fn from(err: hyper::Error) -> Self {
        Self::Http(err)
    }
}

impl From<hyper::http::Error> for Error {
    fn from(err: hyper::http::Error) -> Self {
        Self::Request(err)
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Token(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Form(err) => write!(f, "form encoding error: {err}"),
            Self::Url(err) => write!(f, "url error: {err}"),
            Self::Http(err) => write!(f, "http error: {err}"),
            Self::Request(err) => write!(f, "request error: {err}"),
            Self::Token(err) => write!(f, "token error: {err}"),
            Self::Status { status, body } => write!(f, "unexpected status {status}: {body}"),
            Self::SpreadsheetNotFound(name) => write!(f, "spreadsheet \"{name}\" not found"),
            Self::NoWorksheet(id) => write!(f, "spreadsheet {id} has no worksheets"),
        }
    }
}

impl std::error::Error for Error {}
