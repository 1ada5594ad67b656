//! In-process stand-in for the smart-home REST backend, plus helpers that
//! start the dashboard against it.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};

use homewatch_dashboard::{routes, BackendClient, RequestContext};

pub const TOKEN: &str = "test-token";

// ---

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    // ---
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Start the mock backend and a dashboard pointed at it.
pub async fn start_dashboard(token: Option<&str>, auth_wait: Duration) -> String {
    // ---
    let backend_url = spawn(mock_backend()).await;
    let context = RequestContext::new(token.map(String::from));
    let client = BackendClient::new(&backend_url, context, auth_wait, Duration::from_secs(5))
        .expect("client builds");
    spawn(routes::router(client)).await
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn has_window(params: &HashMap<String, String>, start: &str, end: &str) -> bool {
    params.contains_key(start) && params.contains_key(end) && params.contains_key("timePeriod")
}

pub fn mock_backend() -> Router {
    // ---
    Router::new()
        .route("/devices/", get(devices))
        .route("/devices/usage/", get(device_usage))
        .route("/devices/{id}/", patch(update_device))
        .route("/tags/", get(tags))
        .route("/energy/", get(energy))
}

async fn devices(headers: HeaderMap) -> impl IntoResponse {
    // ---
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        {"deviceId": 1, "name": "Fridge", "roomTag": 10},
        {"deviceId": 2, "name": "Kettle", "roomTag": 10},
        {"deviceId": 3, "name": "Monitor", "roomTag": 20},
        {"deviceId": 4, "name": "Car charger", "roomTag": 30},
        {"deviceId": 5, "name": "Lamp", "roomTag": 40},
        {"deviceId": 6, "name": "Heater", "roomTag": 50},
        {"deviceId": 7, "name": "Spare plug", "roomTag": null}
    ]))
    .into_response()
}

async fn tags(headers: HeaderMap) -> impl IntoResponse {
    // ---
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        {"tagId": 10, "name": "Kitchen", "tagType": "room"},
        {"tagId": 20, "name": "Office", "tagType": "room"},
        {"tagId": 30, "name": "Garage", "tagType": "room"},
        {"tagId": 40, "name": "Bedroom", "tagType": "room"},
        {"tagId": 50, "name": "Hall", "tagType": "room"},
        {"tagId": 99, "name": "Lights", "tagType": "group"}
    ]))
    .into_response()
}

fn series(device_id: i64, values: [f64; 2]) -> Value {
    json!({
        "deviceId": device_id,
        "usage": [
            {"datetime": "2025-03-01T00:00:00Z", "usage": values[0]},
            {"datetime": "2025-03-02T00:00:00Z", "usage": values[1]}
        ]
    })
}

async fn device_usage(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    // ---
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !has_window(&params, "rangeStart", "rangeEnd") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!([
        series(1, [2.0, 3.0]),
        series(2, [1.0, 2.0]),
        series(3, [15.0, 5.0]),
        series(4, [20.0, 30.0]),
        series(5, [1.0, 1.0]),
        series(6, [3.0, 2.0]),
        series(7, [100.0, 100.0])
    ]))
    .into_response()
}

async fn energy(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    // ---
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !has_window(&params, "startDate", "endDate") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!([
        {"datetime": "2025-03-01T00:00:00Z", "energyGeneration": 10.0, "energyUse": 4.0},
        {"datetime": "2025-03-02T00:00:00Z", "energyGeneration": 2.0, "energyUse": 10.0}
    ]))
    .into_response()
}

async fn update_device(
    headers: HeaderMap,
    Path(device_id): Path<i64>,
    Json(patch): Json<Value>,
) -> impl IntoResponse {
    // ---
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if device_id > 7 {
        return StatusCode::NOT_FOUND.into_response();
    }
    let mut device = json!({"deviceId": device_id, "name": "Fridge", "roomTag": 10});
    if let (Some(device), Some(patch)) = (device.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            device.insert(key.clone(), value.clone());
        }
    }
    Json(device).into_response()
}
