//! HTTP handlers for the liveness surface.

use axum::Json;

use crate::models::ApiMessage;

pub async fn root() -> &'static str {
    "FlightSurety Oracle Server"
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// Static acknowledgment the dapp frontend probes for.
pub async fn api_handler() -> Json<ApiMessage> {
    Json(ApiMessage {
        message: "An API for use with your Dapp!".to_string(),
    })
}
