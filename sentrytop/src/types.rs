//! Types that mirror the feed's JSON schema.
//!
//! Every WebSocket text frame is one envelope: `{"event": NAME, "data": PAYLOAD}`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FrameError;

pub const EVENT_HOST_METRICS: &str = "system_metrics_update";
pub const EVENT_NETWORK_RATE: &str = "network_traffic_update";
pub const EVENT_ALERT: &str = "new_alert";

// `null` gets the same treatment as a missing field.
fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProcessInfo {
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub cpu_percent: Option<f64>,
    #[serde(default)]
    pub memory_percent: Option<f64>,
}

// Numeric fields stay optional: a feed that omits one gets a placeholder, not a dropped frame.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct HostMetricsSnapshot {
    #[serde(default)]
    pub cpu_usage: Option<f64>,
    #[serde(default)]
    pub memory_usage: Option<f64>,
    #[serde(default)]
    pub cpu_load: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_processes: Vec<ProcessInfo>,
}

/// Bytes/sec in precomputed mode, cumulative byte counters in derived mode.
/// A missing or null direction reads as 0.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct NetworkRateSample {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sent: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub received: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AlertEvent {
    pub severity: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum InboundEvent {
    #[serde(rename = "system_metrics_update")]
    HostMetrics(HostMetricsSnapshot),
    #[serde(rename = "network_traffic_update")]
    NetworkRate(NetworkRateSample),
    #[serde(rename = "new_alert")]
    Alert(AlertEvent),
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl InboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::HostMetrics(_) => EVENT_HOST_METRICS,
            InboundEvent::NetworkRate(_) => EVENT_NETWORK_RATE,
            InboundEvent::Alert(_) => EVENT_ALERT,
        }
    }

    /// Decode one text frame. The event name picks the payload type.
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let env: Envelope = serde_json::from_str(text).map_err(FrameError::Json)?;
        let payload = |source| FrameError::Payload {
            event: env.event.clone(),
            source,
        };
        match env.event.as_str() {
            EVENT_HOST_METRICS => serde_json::from_value(env.data.clone())
                .map(InboundEvent::HostMetrics)
                .map_err(payload),
            EVENT_NETWORK_RATE => serde_json::from_value(env.data.clone())
                .map(InboundEvent::NetworkRate)
                .map_err(payload),
            EVENT_ALERT => serde_json::from_value(env.data.clone())
                .map(InboundEvent::Alert)
                .map_err(payload),
            other => Err(FrameError::UnknownEvent(other.to_string())),
        }
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
