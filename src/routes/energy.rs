use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use super::{backend_failure, bad_request};
use crate::client::BackendClient;
use crate::energy::decompose_series;
use crate::models::{DateRange, TimePeriod};

// ---

pub fn router() -> Router<BackendClient> {
    // ---
    Router::new().route("/energy", get(handler))
}

/// Query parameters shared by the energy chart and the report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EnergyQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub time_period: TimePeriod,
}

async fn handler(
    Query(params): Query<EnergyQuery>,
    State(client): State<BackendClient>,
) -> impl IntoResponse {
    // ---
    info!("GET /energy - {:?}", params);

    let Some(range) = DateRange::new(params.start_date, params.end_date) else {
        return bad_request("endDate must not precede startDate");
    };

    let records = match client.energy(range, params.time_period).await {
        Ok(records) => records,
        Err(e) => return backend_failure("Failed to fetch energy data", e),
    };

    let breakdown = decompose_series(&records);
    info!("Returning {} energy buckets", breakdown.len());
    (StatusCode::OK, Json(breakdown)).into_response()
}
