//! Route definitions for the FlightSurety oracle server

use axum::{routing::get, Router};

use crate::handlers;

pub fn api_routes() -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/api", get(handlers::api_handler))
}
