mod config;
mod dedup;
mod listener;
mod monitor;
mod persister;
mod pipeline;
pub mod presenter;
mod store;

mod error;
pub use error::Error;

pub use config::Config;
pub use dedup::Deduplicator;
pub use listener::{connect_mqtt, subscribe};
pub use monitor::{Counter, Latest, Monitor, StatsSnapshot};
pub use persister::Persister;
pub use pipeline::{Outcome, Pipeline};
pub use store::{provision_header, TabularStore};

pub type Result<T> = std::result::Result<T, Error>;
