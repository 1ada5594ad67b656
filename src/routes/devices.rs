use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use tracing::info;

use super::{backend_failure, bad_request};
use crate::client::BackendClient;
use crate::models::{DevicePatch, OTHER_ROOMS_TAG};

// ---

pub fn router() -> Router<BackendClient> {
    // ---
    Router::new()
        .route("/devices", get(list))
        .route("/devices/{id}", patch(update))
}

async fn list(State(client): State<BackendClient>) -> impl IntoResponse {
    // ---
    info!("GET /devices");

    match client.devices().await {
        Ok(devices) => (StatusCode::OK, Json(devices)).into_response(),
        Err(e) => backend_failure("Failed to list devices", e),
    }
}

async fn update(
    Path(device_id): Path<i64>,
    State(client): State<BackendClient>,
    Json(patch): Json<DevicePatch>,
) -> impl IntoResponse {
    // ---
    info!("PATCH /devices/{} - {:?}", device_id, patch);

    if patch.room_tag == Some(Some(OTHER_ROOMS_TAG)) {
        return bad_request(format!("Room tag {OTHER_ROOMS_TAG} is reserved"));
    }

    match client.update_device(device_id, &patch).await {
        Ok(device) => (StatusCode::OK, Json(device)).into_response(),
        Err(e) => backend_failure("Failed to update device", e),
    }
}
