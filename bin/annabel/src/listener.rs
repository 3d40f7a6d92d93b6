use std::time::Duration;

use futures_util::stream::StreamExt;
use log::{debug, error, info};
use paho_mqtt as mqtt;

use crate::{Config, Error, Outcome, Pipeline, Result};

pub async fn connect_mqtt(config: &Config) -> Result<mqtt::AsyncClient> {
    let create_opts = mqtt::CreateOptionsBuilder::new_v3()
        .server_uri(&config.mqtt_address)
        .client_id(&config.mqtt_client_id)
        .finalize();

    let client = mqtt::AsyncClient::new(create_opts)?;

    let conn_opts = mqtt::ConnectOptionsBuilder::new_v3()
        .keep_alive_interval(Duration::from_secs(60))
        .clean_session(true)
        .finalize();

    client.connect(conn_opts).await?;
    info!("connected to {}", config.mqtt_address);

    Ok(client)
}

/// Feeds every message on `topic` through the pipeline. Returns
/// [`Error::Disconnected`] once the broker connection is gone.
pub async fn subscribe(
    mut mqtt: mqtt::AsyncClient,
    topic: String,
    mut pipeline: Pipeline,
) -> Result<()> {
    let mut stream = mqtt.get_stream(None);

    mqtt.subscribe(&topic, mqtt::QOS_0).await?;
    info!("subscribed to topic: {topic}");

    while let Some(msg_opt) = stream.next().await {
        let msg = match msg_opt {
            Some(msg) => msg,
            None => break,
        };

        debug!("got message on {}", msg.topic());

        if let Outcome::Queued(key) = pipeline.handle(msg.payload()).await {
            info!("received reading {key}");
        }
    }

    error!("lost MQTT connection");

    Err(Error::Disconnected)
}
