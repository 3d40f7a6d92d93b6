use std::sync::Arc;

use log::{debug, error, warn};
use station::{DedupKey, ParseError, SensorReading, TimestampPolicy};
use tokio::sync::mpsc::{error::TrySendError, Sender};

use crate::{Counter, Deduplicator, Latest, Monitor};

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Queued(DedupKey),
    Duplicate(DedupKey),
    /// Accepted under [`TimestampPolicy::Optional`], shown but not saved.
    Untimestamped,
    Rejected(ParseError),
    /// The persister queue was full or closed.
    Dropped(DedupKey),
}

/// Parse, publish, deduplicate and enqueue one message at a time.
pub struct Pipeline {
    policy: TimestampPolicy,
    dedup: Deduplicator,
    queue: Sender<SensorReading>,
    monitor: Arc<Monitor>,
}

impl Pipeline {
    pub fn new(
        policy: TimestampPolicy,
        dedup: Deduplicator,
        queue: Sender<SensorReading>,
        monitor: Arc<Monitor>,
    ) -> Self {
        Self {
            policy,
            dedup,
            queue,
            monitor,
        }
    }

    /// Marks keys that are already in the store as seen.
    pub fn seed<I: IntoIterator<Item = DedupKey>>(&mut self, keys: I) -> usize {
        let before = self.dedup.len();
        self.dedup.extend(keys);
        self.dedup.len() - before
    }

    pub async fn handle(&mut self, payload: &[u8]) -> Outcome {
        self.monitor.record(Counter::Received);

        let reading = match station::parse_payload(payload, self.policy) {
            Ok(reading) => reading,
            Err(err) => {
                warn!("unable to parse message: {err}");
                debug!("{}", String::from_utf8_lossy(payload));

                self.monitor.record(Counter::ParseError);
                self.monitor.publish(Latest::Error(err.to_string())).await;

                return Outcome::Rejected(err);
            }
        };

        self.monitor.publish(Latest::Reading(reading.clone())).await;

        let key = match reading.key() {
            Some(key) => key,
            None => {
                warn!("reading without timestamp is not saved");
                self.monitor.record(Counter::Untimestamped);
                return Outcome::Untimestamped;
            }
        };

        if self.dedup.contains(&key) {
            debug!("duplicate reading {key}");
            self.monitor.record(Counter::Duplicate);
            return Outcome::Duplicate(key);
        }

        // the key is only marked as seen once the reading has a queue slot
        let permit = match self.queue.try_reserve() {
            Ok(permit) => permit,
            Err(err) => {
                match err {
                    TrySendError::Full(()) => error!("persister queue is full, dropping {key}"),
                    TrySendError::Closed(()) => error!("persister is gone, dropping {key}"),
                }

                self.monitor.record(Counter::Dropped);
                return Outcome::Dropped(key);
            }
        };

        self.dedup.insert(key.clone());
        permit.send(reading);
        debug!("queued reading {key}");

        Outcome::Queued(key)
    }
}
