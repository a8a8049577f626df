//! HTTP boundary of the station: validates incoming payloads, delegates to
//! the readings store and shapes JSON responses. The handlers are stateless;
//! all state lives in the store.

use std::sync::Arc;

use poem::http::StatusCode;
use poem::middleware::Cors;
use poem::web::{Data, Json, Query};
use poem::{Endpoint, EndpointExt, IntoResponse, Response, Route, get, handler, post};
use serde::Deserialize;
use tracing::{debug, error};

use crate::Reading;
use crate::error::StationError;
use crate::store::ReadingsStore;

mod responses;

use responses::{ApiError, DataResponse, HealthResponse, StoredResponse};

/// Assembles the API endpoint. CORS is open to any origin on all routes and
/// the middleware answers OPTIONS preflights with an empty 200 body.
pub fn app(store: Arc<ReadingsStore>) -> impl Endpoint<Output = Response> {
    Route::new()
        .at("/api/store", post(store_reading))
        .at("/api/data", get(get_data))
        .at("/api/health", get(health))
        .with(Cors::new())
        .data(store)
}

#[handler]
async fn store_reading(store: Data<&Arc<ReadingsStore>>, body: String) -> Response {
    let payload: serde_json::Value = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError::with_message("Invalid JSON body", e.to_string())),
            )
                .into_response();
        }
    };

    let reading = match Reading::from_payload(payload) {
        Ok(reading) => reading,
        Err(StationError::Validation(message)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError::with_message(
                    "Missing required sensor data fields",
                    message,
                )),
            )
                .into_response();
        }
        Err(e) => {
            error!("Failed to process payload: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::with_message("Internal server error", e.to_string())),
            )
                .into_response();
        }
    };

    debug!("Got reading: {reading}");
    let timestamp = reading.timestamp();
    match store.append(reading).await {
        Ok(total_readings) => {
            Json(StoredResponse::new(timestamp, total_readings)).into_response()
        }
        Err(e) => {
            error!("Failed to save reading: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Failed to save data")),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct DataQuery {
    limit: Option<i64>,
}

#[handler]
async fn get_data(store: Data<&Arc<ReadingsStore>>, query: Query<DataQuery>) -> Json<DataResponse> {
    // zero and negative limits mean "everything", as does an absent one
    let limit = query
        .limit
        .filter(|limit| *limit > 0)
        .map(|limit| limit as usize);
    Json(DataResponse::new(store.query(limit)))
}

#[handler]
async fn health(store: Data<&Arc<ReadingsStore>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        storage: responses::STORAGE_TYPE,
        total_readings: store.count(),
        data_file: store.data_file().display().to_string(),
    })
}
