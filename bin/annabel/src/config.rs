use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use station::TimestampPolicy;
use uuid::Uuid;

use crate::{Error, Result};

const DEFAULT_MQTT_ADDRESS: &str = "tcp://mqtt-dashboard.com:1883";
const DEFAULT_MQTT_TOPIC: &str = "AWS@port";
const DEFAULT_SPREADSHEET_NAME: &str = "aws brin 2025";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub mqtt_address: String,
    pub mqtt_topic: String,
    pub mqtt_client_id: String,
    pub service_account_path: PathBuf,
    pub spreadsheet_name: String,
    /// Readings waiting for the persister.
    pub queue_capacity: usize,
    /// Most recent keys kept for deduplication, `0` keeps all of them.
    pub dedup_capacity: usize,
    pub seed_dedup: bool,
    pub timestamp_policy: TimestampPolicy,
    pub persist_retries: u32,
    pub retry_delay: Duration,
    pub render_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_owned());

        let service_account_path = lookup("GOOGLE_SERVICE_ACCOUNT")
            .ok_or(Error::MissingVariable("GOOGLE_SERVICE_ACCOUNT"))?
            .into();

        let timestamp_policy = if flag(&lookup, "REQUIRE_TIMESTAMP", true)? {
            TimestampPolicy::Required
        } else {
            TimestampPolicy::Optional
        };

        let render_interval_ms = non_zero(&lookup, "RENDER_INTERVAL_MS", 1000)?;

        Ok(Self {
            mqtt_address: string("MQTT_ADDRESS", DEFAULT_MQTT_ADDRESS),
            mqtt_topic: string("MQTT_TOPIC", DEFAULT_MQTT_TOPIC),
            mqtt_client_id: lookup("MQTT_CLIENT_ID")
                .unwrap_or_else(|| format!("annabel-{}", Uuid::new_v4().simple())),
            service_account_path,
            spreadsheet_name: string("SPREADSHEET_NAME", DEFAULT_SPREADSHEET_NAME),
            queue_capacity: non_zero(&lookup, "QUEUE_CAPACITY", 64)?,
            dedup_capacity: parse(&lookup, "DEDUP_CAPACITY", 100_000)?,
            seed_dedup: flag(&lookup, "SEED_DEDUP", true)?,
            timestamp_policy,
            persist_retries: parse(&lookup, "PERSIST_RETRIES", 3)?,
            retry_delay: Duration::from_millis(parse(&lookup, "RETRY_DELAY_MS", 1000)?),
            render_interval: Duration::from_millis(render_interval_ms),
        })
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::InvalidVariable { name, value }),
    }
}

fn non_zero<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialEq + ToString,
{
    let value = parse(lookup, name, default)?;

    if value == T::default() {
        return Err(Error::InvalidVariable {
            name,
            value: value.to_string(),
        });
    }

    Ok(value)
}

fn flag<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(name) {
        None => return Ok(default),
        Some(value) => value,
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidVariable { name, value }),
    }
}
