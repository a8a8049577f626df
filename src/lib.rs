use chrono::Utc;

use crate::error::StationError;

pub mod api;
pub mod config;
pub mod error;
pub mod store;

/// One timestamped environmental sample as reported by the sensor agent.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Reading {
    #[serde(deserialize_with = "lenient_float::deserialize")]
    temperature: f64,
    #[serde(deserialize_with = "lenient_float::deserialize")]
    humidity: f64,
    #[serde(deserialize_with = "lenient_float::deserialize")]
    pressure: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gas: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    altitude: Option<f64>,
    #[serde(default = "default_timestamp")]
    timestamp: chrono::DateTime<chrono::Utc>,
}

impl Reading {
    /// Maps a raw JSON payload to a validated reading.
    ///
    /// `temperature`, `humidity` and `pressure` are mandatory; `gas`,
    /// `altitude` and `timestamp` pass through when present. A missing
    /// timestamp is assigned the current UTC time. Payloads that are not
    /// JSON objects are rejected.
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, StationError> {
        if !payload.is_object() {
            return Err(StationError::Validation(
                "payload is not a JSON object".to_string(),
            ));
        }
        serde_json::from_value(payload).map_err(|e| StationError::Validation(e.to_string()))
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        self.timestamp
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] - temperature: {}, humidity: {}, pressure: {}",
            self.timestamp.to_rfc3339(),
            self.temperature,
            self.humidity,
            self.pressure
        )
    }
}

fn default_timestamp() -> chrono::DateTime<Utc> {
    Utc::now()
}

mod lenient_float {
    use serde::{self, Deserialize, Deserializer};

    /// Sensor firmwares disagree on whether numeric fields arrive as JSON
    /// numbers or as strings; accept both.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Debug, Deserialize)]
        #[serde(untagged)]
        enum FloatOrString {
            Float(f64),
            Number(i64),
            String(String),
        }
        match FloatOrString::deserialize(deserializer)? {
            FloatOrString::Float(f) => Ok(f),
            FloatOrString::Number(n) => Ok(n as f64),
            FloatOrString::String(as_string) => as_string.parse().map_err(|e| {
                tracing::error!("Failed to parse string to float: {e}");
                serde::de::Error::custom(e)
            }),
        }
    }
}
