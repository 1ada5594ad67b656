//! Data models shared by the backend client, the aggregation core and the
//! dashboard routes.
//!
//! Field names follow the backend's camelCase JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Sentinel room tag of the synthetic "Other Rooms" aggregate.
pub const OTHER_ROOMS_TAG: i64 = -1;

/// Display label of the synthetic "Other Rooms" aggregate.
pub const OTHER_ROOMS_LABEL: &str = "Other Rooms";

/// One measurement for one device in one time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSample {
    // ---
    pub datetime: DateTime<Utc>,
    pub usage: f64,
}

/// Per-device raw usage series for a query window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUsage {
    // ---
    pub device_id: i64,
    #[serde(default)]
    pub usage: Vec<UsageSample>,
}

/// A device as listed by `GET /devices/`.
///
/// Only the fields the dashboard acts on are typed; the rest of the record is
/// kept in `extra` so editing round-trips without losing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    // ---
    pub device_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub room_tag: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Partial update sent with `PATCH /devices/{id}/`.
///
/// `room_tag` is doubly optional: absent leaves the room untouched,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePatch {
    // ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub room_tag: Option<Option<i64>>,
}

fn deserialize_some<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

/// A tag as listed by `GET /tags/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    // ---
    pub tag_id: i64,
    pub name: String,
    #[serde(default)]
    pub tag_type: String,
}

impl Tag {
    pub fn is_room(&self) -> bool {
        self.tag_type.eq_ignore_ascii_case("room")
    }
}

/// A label identifying a physical room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTag {
    // ---
    pub tag_id: i64,
    pub name: String,
}

impl From<&Tag> for RoomTag {
    fn from(tag: &Tag) -> Self {
        RoomTag {
            tag_id: tag.tag_id,
            name: tag.name.clone(),
        }
    }
}

/// Keep only room tags, dropping any that claims the reserved sentinel id.
pub fn room_tags(tags: &[Tag]) -> Vec<RoomTag> {
    // ---
    tags.iter()
        .filter(|t| t.is_room() && t.tag_id != OTHER_ROOMS_TAG)
        .map(RoomTag::from)
        .collect()
}

/// Aggregated usage of one room, or of the "Other Rooms" overflow bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUsage {
    // ---
    pub room_tag: i64,
    pub label: String,
    pub total_usage: f64,
    pub usage: Vec<UsageSample>,
}

impl RoomUsage {
    pub fn is_other_rooms(&self) -> bool {
        self.room_tag == OTHER_ROOMS_TAG
    }
}

/// One energy bucket as returned by `GET /energy/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyRecord {
    // ---
    pub datetime: DateTime<Utc>,
    pub energy_generation: f64,
    pub energy_use: f64,
}

/// Stacked-bar decomposition of one [`EnergyRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyBreakdown {
    // ---
    pub datetime: DateTime<Utc>,
    pub net_energy: f64,
    pub energy_generated: f64,
    pub energy_usage: f64,
}

/// Bucket size requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl TimePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::Hourly => "hourly",
            TimePeriod::Daily => "daily",
            TimePeriod::Weekly => "weekly",
            TimePeriod::Monthly => "monthly",
        }
    }
}

/// Inclusive calendar window of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    // ---
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting one that ends before it starts.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(DateRange { start, end })
    }
}
