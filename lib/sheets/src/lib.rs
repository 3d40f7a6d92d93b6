mod api;
mod client;
mod service_account;
mod spreadsheet;
mod token;

mod error;
pub use error::Error;

pub use client::Client;
pub use service_account::ServiceAccountKey;
pub use spreadsheet::{Spreadsheet, Worksheet};

pub type Result<T> = std::result::Result<T, Error>;
