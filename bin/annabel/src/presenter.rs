//! Text dashboard of the latest reading.

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use station::SensorReading;
use tokio::time;

use crate::{Latest, Monitor, StatsSnapshot};

const TITLE: &str = "LIVE DATA MONITORING AWS";
const CLEAR: &str = "\x1b[2J\x1b[H";

/// Label and unit of every row under the caption.
const ROWS: [(&str, &str); 10] = [
    ("Time", ""),
    ("Date", ""),
    ("Temperature", "°C"),
    ("Humidity", "%"),
    ("Rainfall", "mm"),
    ("Wind Speed", "m/s"),
    ("Wind Direction", "°"),
    ("Pressure", "hPa"),
    ("Radiation", "W/m²"),
    ("Signal", ""),
];

pub fn render(latest: &Latest, stats: &StatsSnapshot, topic: &str) -> String {
    let mut frame = format!("{TITLE}\nMQTT topic: {topic}\n\n");

    match latest {
        Latest::Error(message) => frame.push_str(&format!("ERROR: {message}\n")),
        Latest::Waiting => {
            for (label, unit) in ROWS {
                frame.push_str(&row(label, "-", unit));
            }
        }
        Latest::Reading(reading) => {
            for ((label, unit), value) in ROWS.into_iter().zip(values(reading)) {
                frame.push_str(&row(label, &value, unit));
            }
        }
    }

    frame.push('\n');
    frame.push_str(&status(stats));

    frame
}

fn values(reading: &SensorReading) -> [String; 10] {
    [
        reading.time().unwrap_or("-").to_owned(),
        reading.date().unwrap_or("-").to_owned(),
        float(reading.temperature),
        reading.humidity.to_string(),
        float(reading.rainfall),
        float(reading.wind_speed),
        reading.wind_direction.to_string(),
        float(reading.pressure),
        float(reading.radiation),
        reading.signal.to_string(),
    ]
}

fn row(label: &str, value: &str, unit: &str) -> String {
    if unit.is_empty() {
        format!("{label:<15}: {value}\n")
    } else {
        format!("{label:<15}: {value} {unit}\n")
    }
}

fn status(stats: &StatsSnapshot) -> String {
    format!(
        "received {} | saved {} | duplicates {} | parse errors {} | untimestamped {} | \
         dropped {} | failed {}\n",
        stats.received,
        stats.persisted,
        stats.duplicates,
        stats.parse_errors,
        stats.untimestamped,
        stats.dropped,
        stats.failed,
    )
}

// whole numbers keep one decimal, `0.0` rather than `0`
fn float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Redraws the dashboard every `interval` until the task is aborted.
pub async fn run(monitor: Arc<Monitor>, topic: String, interval: Duration) {
    let mut interval = time::interval(interval);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let latest = monitor.latest().await;
        let frame = render(&latest, &monitor.stats(), &topic);

        {
            let mut stdout = std::io::stdout().lock();
            if let Err(err) = write!(stdout, "{CLEAR}{frame}").and_then(|_| stdout.flush()) {
                warn!("unable to draw dashboard: {err}");
            }
        }

        debug!("rendered {latest:?}");
    }
}
