//! Energy report for a time window.
//!
//! Collects the figures the dashboard prints into its report: energy totals,
//! the per-bucket stacked decomposition, and each room's share of device usage.

use serde::Serialize;

use crate::aggregate::room_shares;
use crate::energy::decompose_series;
use crate::models::{DateRange, EnergyBreakdown, EnergyRecord, RoomUsage, TimePeriod};

// ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyReport {
    // ---
    pub range: DateRange,
    pub time_period: TimePeriod,
    pub total_generation: f64,
    pub total_use: f64,
    /// Generation minus use over the whole window; positive is surplus.
    pub net_energy: f64,
    pub energy: Vec<EnergyBreakdown>,
    pub rooms: Vec<RoomSummary>,
}

/// One row of the report's room table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    // ---
    pub room_tag: i64,
    pub label: String,
    pub total_usage: f64,
    pub share: f64,
}

pub fn build_report(
    range: DateRange,
    time_period: TimePeriod,
    records: &[EnergyRecord],
    rooms: &[RoomUsage],
) -> EnergyReport {
    // ---
    let total_generation = records.iter().fold(0.0, |acc, r| acc + r.energy_generation);
    let total_use = records.iter().fold(0.0, |acc, r| acc + r.energy_use);

    let rooms = rooms
        .iter()
        .zip(room_shares(rooms))
        .map(|(room, share)| RoomSummary {
            room_tag: room.room_tag,
            label: room.label.clone(),
            total_usage: room.total_usage,
            share,
        })
        .collect();

    EnergyReport {
        range,
        time_period,
        total_generation,
        total_use,
        net_energy: total_generation - total_use,
        energy: decompose_series(records),
        rooms,
    }
}
