use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use station::SensorReading;
use tokio::sync::mpsc::Receiver;
use tokio::time;

use crate::{Counter, Monitor, TabularStore};

/// Drains the reading queue into the store, one row per reading.
pub struct Persister<S> {
    store: S,
    monitor: Arc<Monitor>,
    retries: u32,
    retry_delay: Duration,
}

impl<S: TabularStore> Persister<S> {
    pub fn new(store: S, monitor: Arc<Monitor>, retries: u32, retry_delay: Duration) -> Self {
        Self {
            store,
            monitor,
            retries,
            retry_delay,
        }
    }

    /// Runs until every sender of `queue` is dropped and the queue is empty.
    pub async fn run(self, mut queue: Receiver<SensorReading>) {
        while let Some(reading) = queue.recv().await {
            let key = reading
                .key()
                .map(|key| key.to_string())
                .unwrap_or_default();

            match self.persist(&reading).await {
                Ok(()) => {
                    info!("saved reading {key}");
                    self.monitor.record(Counter::Persisted);
                }
                Err(err) => {
                    error!("unable to save reading {key}: {err}");
                    self.monitor.record(Counter::Failed);
                }
            }
        }

        debug!("reading queue closed");
    }

    async fn persist(&self, reading: &SensorReading) -> sheets::Result<()> {
        let mut attempt = 0;
        let mut delay = self.retry_delay;

        loop {
            match self.store.append_row(reading.to_row()).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "append failed: {err}, retry {attempt}/{} in {delay:?}",
                        self.retries
                    );
                    time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockTabularStore;
    use crate::{provision_header, Deduplicator, Outcome, Pipeline};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use serde_json::json;
    use station::{TimestampPolicy, HEADER};
    use tokio::sync::mpsc;

    const MESSAGE: &str = "12:30:00 01-01-2025 Temp=25.5 Kelembaban=60 W.Speed=1.2 W.Dir=180 \
        Press=1012.3 Hujan=0.0 Rad=300.0 Signal=90";

    fn unavailable() -> sheets::Error {
        sheets::Error::Status {
            status: 503,
            body: "backend unavailable".to_owned(),
        }
    }

    fn persister(
        store: MockTabularStore,
        retries: u32,
    ) -> (Persister<MockTabularStore>, Arc<Monitor>) {
        let monitor = Arc::new(Monitor::new());
        let persister = Persister::new(store, monitor.clone(), retries, Duration::from_millis(1));
        (persister, monitor)
    }

    fn pipeline(queue: mpsc::Sender<SensorReading>, monitor: Arc<Monitor>) -> Pipeline {
        Pipeline::new(
            TimestampPolicy::Required,
            Deduplicator::new(100),
            queue,
            monitor,
        )
    }

    #[tokio::test]
    async fn test_row_is_appended_in_column_order() {
        let mut store = MockTabularStore::new();
        store
            .expect_append_row()
            .with(eq(vec![
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
            ]))
            .times(1)
            .returning(|_| Ok(()));

        let (persister, monitor) = persister(store, 0);
        let (tx, rx) = mpsc::channel(4);

        tx.send(station::parse(MESSAGE, TimestampPolicy::Required).unwrap())
            .await
            .unwrap();
        drop(tx);

        persister.run(rx).await;

        assert_eq!(monitor.stats().persisted, 1);
    }

    #[tokio::test]
    async fn test_identical_timestamps_append_one_row() {
        let mut store = MockTabularStore::new();
        store.expect_append_row().times(1).returning(|_| Ok(()));

        let (persister, monitor) = persister(store, 0);
        let (tx, rx) = mpsc::channel(4);
        let mut pipeline = pipeline(tx, monitor.clone());

        pipeline.handle(MESSAGE.as_bytes()).await;
        pipeline
            .handle(MESSAGE.replace("Signal=90", "Signal=75").as_bytes())
            .await;
        drop(pipeline);

        persister.run(rx).await;

        assert_eq!(monitor.stats().persisted, 1);
        assert_eq!(monitor.stats().duplicates, 1);
    }

    #[tokio::test]
    async fn test_distinct_timestamps_append_two_rows() {
        let mut store = MockTabularStore::new();
        store.expect_append_row().times(2).returning(|_| Ok(()));

        let (persister, monitor) = persister(store, 0);
        let (tx, rx) = mpsc::channel(4);
        let mut pipeline = pipeline(tx, monitor.clone());

        pipeline.handle(MESSAGE.as_bytes()).await;
        pipeline
            .handle(MESSAGE.replace("12:30:00", "12:31:00").as_bytes())
            .await;
        drop(pipeline);

        persister.run(rx).await;

        assert_eq!(monitor.stats().persisted, 2);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let mut store = MockTabularStore::new();
        let mut seq = Sequence::new();
        store
            .expect_append_row()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(unavailable()));
        store
            .expect_append_row()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let (persister, monitor) = persister(store, 3);
        let (tx, rx) = mpsc::channel(4);

        tx.send(station::parse(MESSAGE, TimestampPolicy::Required).unwrap())
            .await
            .unwrap();
        drop(tx);

        persister.run(rx).await;

        assert_eq!(monitor.stats().persisted, 1);
        assert_eq!(monitor.stats().failed, 0);
    }

    #[tokio::test]
    async fn test_failure_is_counted_and_next_reading_is_saved() {
        let mut store = MockTabularStore::new();
        let mut seq = Sequence::new();
        store
            .expect_append_row()
            .times(3)
            .in_sequence(&mut seq)
            .returning(|_| Err(unavailable()));
        store
            .expect_append_row()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let (persister, monitor) = persister(store, 2);
        let (tx, rx) = mpsc::channel(4);
        let mut pipeline = pipeline(tx, monitor.clone());

        pipeline.handle(MESSAGE.as_bytes()).await;
        pipeline
            .handle(MESSAGE.replace("12:30:00", "12:31:00").as_bytes())
            .await;
        drop(pipeline);

        persister.run(rx).await;

        assert_eq!(monitor.stats().failed, 1);
        assert_eq!(monitor.stats().persisted, 1);
    }

    #[tokio::test]
    async fn test_header_is_provisioned_before_first_row() {
        let mut store = MockTabularStore::new();
        let mut seq = Sequence::new();
        store
            .expect_header()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec!["Date".to_owned()]));
        store
            .expect_insert_header()
            .with(eq(HEADER.iter().map(|name| name.to_string()).collect::<Vec<_>>()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_append_row()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        assert!(provision_header(&store).await.unwrap());

        let (persister, monitor) = persister(store, 0);
        let (tx, rx) = mpsc::channel(4);
        let mut pipeline = pipeline(tx, monitor.clone());

        assert!(matches!(
            pipeline.handle(MESSAGE.as_bytes()).await,
            Outcome::Queued(_)
        ));
        drop(pipeline);

        persister.run(rx).await;
    }
}
