use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Reading;

/// Storage backend identifier reported on every response.
pub const STORAGE_TYPE: &str = "local";

/// Body returned by `POST /api/store` on success.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub total_readings: usize,
    pub storage_type: &'static str,
}

impl StoredResponse {
    pub fn new(timestamp: DateTime<Utc>, total_readings: usize) -> Self {
        Self {
            success: true,
            message: "Data stored successfully",
            timestamp,
            total_readings,
            storage_type: STORAGE_TYPE,
        }
    }
}

/// Body returned by `GET /api/data`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Reading>,
    pub storage_type: &'static str,
}

impl DataResponse {
    pub fn new(data: Vec<Reading>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            storage_type: STORAGE_TYPE,
        }
    }
}

/// Body returned by `GET /api/health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
    pub total_readings: usize,
    pub data_file: String,
}

/// Error body shared by all failure responses.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(error: &'static str) -> Self {
        Self {
            error,
            message: None,
        }
    }

    pub fn with_message(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: Some(message.into()),
        }
    }
}
