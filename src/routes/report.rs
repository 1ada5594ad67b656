use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use tracing::{debug, info};

use super::energy::EnergyQuery;
use super::{backend_failure, bad_request};
use crate::aggregate::aggregate_usage_by_room;
use crate::client::BackendClient;
use crate::models::{room_tags, DateRange};
use crate::report::build_report;

// ---

pub fn router() -> Router<BackendClient> {
    // ---
    Router::new().route("/report", get(handler))
}

async fn handler(
    Query(params): Query<EnergyQuery>,
    State(client): State<BackendClient>,
) -> impl IntoResponse {
    // ---
    info!("GET /report - {:?}", params);

    let Some(range) = DateRange::new(params.start_date, params.end_date) else {
        return bad_request("endDate must not precede startDate");
    };

    debug!("GET /report - Fetching energy, devices, tags and usage");
    let fetched = tokio::try_join!(
        client.energy(range, params.time_period),
        client.devices(),
        client.tags(),
        client.device_usage(range, params.time_period),
    );
    let (records, devices, tags, usage) = match fetched {
        Ok(fetched) => fetched,
        Err(e) => return backend_failure("Failed to fetch report data", e),
    };

    let rooms = aggregate_usage_by_room(&devices, &room_tags(&tags), &usage);
    let report = build_report(range, params.time_period, &records, &rooms);

    info!(
        "Report ready: {} energy buckets, {} rooms",
        report.energy.len(),
        report.rooms.len()
    );
    (StatusCode::OK, Json(report)).into_response()
}
