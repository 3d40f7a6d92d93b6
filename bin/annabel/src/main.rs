use std::sync::Arc;
use std::time::Duration;

use annabel::{
    connect_mqtt, presenter, provision_header, subscribe, Config, Deduplicator, Monitor,
    Persister, Pipeline, TabularStore,
};
use sheets::ServiceAccountKey;

use log::{error, info, warn};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task;
use tokio::time;

type ErasedError = Box<dyn std::error::Error + Send + Sync + 'static>;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), ErasedError> {
    pretty_env_logger::init_timed();

    info!("annabel version {VERSION}");

    let config = Config::from_env()?;

    let key = ServiceAccountKey::from_file(&config.service_account_path).await?;
    info!("using service account {}", key.client_email);

    let spreadsheet = sheets::Client::new(key)
        .open(&config.spreadsheet_name)
        .await?;
    let worksheet = spreadsheet.first_worksheet().await?;
    info!(
        "opened worksheet {} of {}",
        worksheet.title(),
        spreadsheet.title()
    );

    if provision_header(&worksheet).await? {
        info!("inserted header row");
    }

    let monitor = Arc::new(Monitor::new());
    let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity);

    let mut pipeline = Pipeline::new(
        config.timestamp_policy,
        Deduplicator::new(config.dedup_capacity),
        queue_tx,
        monitor.clone(),
    );

    if config.seed_dedup {
        let keys = worksheet.recorded_keys().await?;
        let total = keys.len();
        let seeded = pipeline.seed(keys);
        info!("seeded {seeded} of {total} saved readings");
    }

    let mqtt_client = connect_mqtt(&config).await?;

    let mut sigterm = signal(SignalKind::terminate())?;

    let persister = Persister::new(
        worksheet,
        monitor.clone(),
        config.persist_retries,
        config.retry_delay,
    );
    let persister_handle = task::spawn(persister.run(queue_rx));

    let mut listener_handle = task::spawn(subscribe(
        mqtt_client,
        config.mqtt_topic.clone(),
        pipeline,
    ));

    let presenter_handle = task::spawn(presenter::run(
        monitor,
        config.mqtt_topic.clone(),
        config.render_interval,
    ));

    let listener_done = tokio::select! {
        result = &mut listener_handle => {
            match result {
                Ok(Ok(())) => info!("listener finished"),
                Ok(Err(err)) => error!("listener stopped: {err}"),
                Err(err) => error!("listener panicked: {err}"),
            }
            true
        },
        _ = sigterm.recv() => {
            info!("got SIGTERM, exiting...");
            false
        },
        _ = tokio::signal::ctrl_c() => {
            info!("got Ctrl-C, exiting...");
            false
        },
    };

    if listener_done {
        // the dashboard keeps showing the last reading until stopped
        tokio::select! {
            _ = sigterm.recv() => info!("got SIGTERM, exiting..."),
            _ = tokio::signal::ctrl_c() => info!("got Ctrl-C, exiting..."),
        }
    } else {
        listener_handle.abort();
        let _ = listener_handle.await;
    }

    presenter_handle.abort();

    // the listener owned the only queue sender, the persister stops once it is drained
    match time::timeout(DRAIN_TIMEOUT, persister_handle).await {
        Ok(Ok(())) => info!("saved pending readings"),
        Ok(Err(err)) => error!("persister panicked: {err}"),
        Err(_) => warn!("gave up on pending readings after {DRAIN_TIMEOUT:?}"),
    }

    Ok(())
}
