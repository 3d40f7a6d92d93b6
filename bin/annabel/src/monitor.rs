use std::sync::atomic::{AtomicU64, Ordering};

use station::SensorReading;
use tokio::sync::Mutex;

/// What the dashboard shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Latest {
    #[default]
    Waiting,
    Reading(SensorReading),
    Error(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Counter {
    Received,
    ParseError,
    Duplicate,
    Untimestamped,
    Dropped,
    Persisted,
    Failed,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub received: u64,
    pub parse_errors: u64,
    pub duplicates: u64,
    pub untimestamped: u64,
    pub dropped: u64,
    pub persisted: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Stats {
    received: AtomicU64,
    parse_errors: AtomicU64,
    duplicates: AtomicU64,
    untimestamped: AtomicU64,
    dropped: AtomicU64,
    persisted: AtomicU64,
    failed: AtomicU64,
}

/// State shared between the listener, the persister and the presenter:
/// the latest reading and the pipeline counters.
#[derive(Debug, Default)]
pub struct Monitor {
    latest: Mutex<Latest>,
    stats: Stats,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the latest value as a whole.
    pub async fn publish(&self, latest: Latest) {
        *self.latest.lock().await = latest;
    }

    pub async fn latest(&self) -> Latest {
        self.latest.lock().await.clone()
    }

    pub fn record(&self, counter: Counter) {
        let stats = &self.stats;
        let counter = match counter {
            Counter::Received => &stats.received,
            Counter::ParseError => &stats.parse_errors,
            Counter::Duplicate => &stats.duplicates,
            Counter::Untimestamped => &stats.untimestamped,
            Counter::Dropped => &stats.dropped,
            Counter::Persisted => &stats.persisted,
            Counter::Failed => &stats.failed,
        };

        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> StatsSnapshot {
        let stats = &self.stats;

        StatsSnapshot {
            received: stats.received.load(Ordering::Relaxed),
            parse_errors: stats.parse_errors.load(Ordering::Relaxed),
            duplicates: stats.duplicates.load(Ordering::Relaxed),
            untimestamped: stats.untimestamped.load(Ordering::Relaxed),
            dropped: stats.dropped.load(Ordering::Relaxed),
            persisted: stats.persisted.load(Ordering::Relaxed),
            failed: stats.failed.load(Ordering::Relaxed),
        }
    }
}
