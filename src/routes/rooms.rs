use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{backend_failure, bad_request};
use crate::aggregate::{aggregate_usage_by_room, room_shares, select_rooms};
use crate::client::BackendClient;
use crate::models::{room_tags, DateRange, RoomUsage, TimePeriod};

// ---

pub fn router() -> Router<BackendClient> {
    // ---
    Router::new().route("/rooms/usage", get(handler))
}

/// Query parameters of `GET /rooms/usage`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomUsageQuery {
    range_start: NaiveDate,
    range_end: NaiveDate,
    #[serde(default)]
    time_period: TimePeriod,
    /// Comma-separated room tag ids; absent or empty selects every room.
    rooms: Option<String>,
}

/// One chart series: the room's aggregate plus its share of the total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoomChartEntry {
    #[serde(flatten)]
    room: RoomUsage,
    share: f64,
}

async fn handler(
    Query(params): Query<RoomUsageQuery>,
    State(client): State<BackendClient>,
) -> impl IntoResponse {
    // ---
    info!("GET /rooms/usage - {:?}", params);

    let Some(range) = DateRange::new(params.range_start, params.range_end) else {
        return bad_request("rangeEnd must not precede rangeStart");
    };
    let selected = match parse_room_selection(params.rooms.as_deref()) {
        Ok(selected) => selected,
        Err(bad) => return bad_request(format!("Invalid room tag in selection: {bad}")),
    };

    debug!("GET /rooms/usage - Fetching devices, tags and usage");
    let fetched = tokio::try_join!(
        client.devices(),
        client.tags(),
        client.device_usage(range, params.time_period),
    );
    let (devices, tags, usage) = match fetched {
        Ok(fetched) => fetched,
        Err(e) => return backend_failure("Failed to fetch room usage data", e),
    };

    let devices = select_rooms(&devices, &selected);
    let rooms = aggregate_usage_by_room(&devices, &room_tags(&tags), &usage);
    let shares = room_shares(&rooms);

    let entries: Vec<RoomChartEntry> = rooms
        .into_iter()
        .zip(shares)
        .map(|(room, share)| RoomChartEntry { room, share })
        .collect();

    info!("Returning {} room series", entries.len());
    (StatusCode::OK, Json(entries)).into_response()
}

/// Parse `"1, 2,3"` into tag ids, returning the first unparsable item on error.
fn parse_room_selection(raw: Option<&str>) -> Result<Vec<i64>, String> {
    // ---
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<i64>().map_err(|_| item.to_string()))
        .collect()
}
