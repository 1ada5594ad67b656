//! Session token handling and request status.
//!
//! The dashboard does not authenticate users itself; the UI hands over the
//! backend token it obtained, and backend calls waiting for it resume.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::bad_request;
use crate::client::BackendClient;

// ---

pub fn router() -> Router<BackendClient> {
    // ---
    Router::new()
        .route("/session/token", put(set_token).delete(clear_token))
        .route("/status", get(status))
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    loading: bool,
    in_flight: usize,
    authenticated: bool,
}

async fn set_token(
    State(client): State<BackendClient>,
    Json(body): Json<TokenBody>,
) -> impl IntoResponse {
    // ---
    if body.token.trim().is_empty() {
        return bad_request("token must not be empty");
    }
    info!("PUT /session/token - token updated");
    client.context().set_token(body.token);
    StatusCode::NO_CONTENT.into_response()
}

async fn clear_token(State(client): State<BackendClient>) -> impl IntoResponse {
    // ---
    info!("DELETE /session/token - token cleared");
    client.context().clear_token();
    StatusCode::NO_CONTENT
}

async fn status(State(client): State<BackendClient>) -> Json<StatusResponse> {
    // ---
    let ctx = client.context();
    Json(StatusResponse {
        loading: ctx.is_loading(),
        in_flight: ctx.in_flight(),
        authenticated: ctx.is_authenticated(),
    })
}
