//! Dashboard API gateway.
//!
//! Each sibling module exports a subrouter over the shared [`BackendClient`]
//! state; `main.rs` only sees the merged router (EMBP).

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json, Router};
use serde_json::json;
use tracing::error;

use crate::client::{BackendClient, ClientError};

mod devices;
mod energy;
mod health;
mod report;
mod rooms;
mod session;

// ---

pub fn router(client: BackendClient) -> Router {
    // ---
    Router::new()
        .merge(rooms::router())
        .merge(energy::router())
        .merge(report::router())
        .merge(devices::router())
        .merge(session::router())
        .merge(health::router())
        .with_state(client)
}

// ---

/// Log a failed backend call and answer with the matching status.
fn backend_failure(what: &str, e: ClientError) -> Response {
    // ---
    error!("{}: {}", what, e);
    (e.status_code(), Json(json!({ "error": what }))).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    // ---
    let message = message.into();
    tracing::debug!("Rejecting request: {}", message);
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
