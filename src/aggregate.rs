//! Room-level aggregation of per-device usage series.
//!
//! Devices are grouped by their room tag, each room's member series are summed
//! bucket by bucket, and when there are more than [`MAX_ROOMS`] rooms the
//! lowest consumers are collapsed into a single "Other Rooms" entry so charts
//! stay legible.
//!
//! Series are combined by position, not by timestamp: every series of one
//! query window is expected to have the same length and bucket alignment. An
//! index that one series lacks reads as [`Sample::Missing`] and contributes 0.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{
    Device, DeviceUsage, RoomTag, RoomUsage, UsageSample, OTHER_ROOMS_LABEL, OTHER_ROOMS_TAG,
};

// ---

/// Maximum number of entries returned once overflow collapsing applies.
pub const MAX_ROOMS: usize = 4;

/// Rooms kept individually when collapsing.
const KEPT_ROOMS: usize = MAX_ROOMS - 1;

/// A series value read at a position that may not exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Present(f64),
    Missing,
}

impl Sample {
    /// Read `series` at `index`.
    pub fn at(series: &[UsageSample], index: usize) -> Sample {
        // ---
        match series.get(index) {
            Some(sample) => Sample::Present(sample.usage),
            None => Sample::Missing,
        }
    }

    /// Contribution of this sample to a sum.
    pub fn or_zero(self) -> f64 {
        match self {
            Sample::Present(value) => value,
            Sample::Missing => 0.0,
        }
    }
}

/// Devices sharing one room tag, in first-seen order.
#[derive(Debug)]
struct RoomBucket {
    room_tag: i64,
    device_ids: Vec<i64>,
}

/// Aggregate per-device usage into at most [`MAX_ROOMS`] room entries.
///
/// Devices without a room are ignored. Room-tagged devices with no entry in
/// `device_usage` are members of their room but add nothing to it. The result
/// is sorted by descending `total_usage`, with "Other Rooms" (if any) last.
pub fn aggregate_usage_by_room(
    devices: &[Device],
    room_tags: &[RoomTag],
    device_usage: &[DeviceUsage],
) -> Vec<RoomUsage> {
    // ---
    let buckets = group_by_room(devices);

    let mut series_by_device: HashMap<i64, &[UsageSample]> = HashMap::new();
    for entry in device_usage {
        series_by_device
            .entry(entry.device_id)
            .or_insert(entry.usage.as_slice());
    }

    let labels: HashMap<i64, &str> = room_tags
        .iter()
        .map(|t| (t.tag_id, t.name.as_str()))
        .collect();

    let rooms: Vec<RoomUsage> = buckets
        .iter()
        .map(|bucket| {
            let usage = sum_room_series(bucket, &series_by_device);
            RoomUsage {
                room_tag: bucket.room_tag,
                label: labels
                    .get(&bucket.room_tag)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| format!("Room {}", bucket.room_tag)),
                total_usage: series_total(&usage),
                usage,
            }
        })
        .collect();

    tracing::debug!(
        devices = devices.len(),
        series = device_usage.len(),
        rooms = rooms.len(),
        "Grouped device usage by room"
    );

    let mut rooms = collapse_overflow(rooms);
    rooms.sort_by(|a, b| {
        a.is_other_rooms()
            .cmp(&b.is_other_rooms())
            .then_with(|| compare_totals(b.total_usage, a.total_usage))
    });
    rooms
}

/// Keep only devices whose room is in `selected`; an empty selection keeps all.
pub fn select_rooms(devices: &[Device], selected: &[i64]) -> Vec<Device> {
    // ---
    devices
        .iter()
        .filter(|d| selected.is_empty() || d.room_tag.is_some_and(|t| selected.contains(&t)))
        .cloned()
        .collect()
}

/// Share of `room_total` in `grand_total`, 0 when the share is undefined.
pub fn usage_share(room_total: f64, grand_total: f64) -> f64 {
    // ---
    if grand_total == 0.0 {
        return 0.0;
    }
    let share = room_total / grand_total;
    if share.is_nan() {
        0.0
    } else {
        share
    }
}

/// Shares of every room in `rooms`, in the same order.
pub fn room_shares(rooms: &[RoomUsage]) -> Vec<f64> {
    // ---
    let grand_total = rooms.iter().fold(0.0, |acc, r| acc + r.total_usage);
    rooms
        .iter()
        .map(|r| usage_share(r.total_usage, grand_total))
        .collect()
}

// ---

fn group_by_room(devices: &[Device]) -> Vec<RoomBucket> {
    // ---
    let mut buckets: Vec<RoomBucket> = Vec::new();

    for device in devices {
        let Some(room_tag) = device.room_tag else {
            continue;
        };
        if room_tag == OTHER_ROOMS_TAG {
            tracing::warn!(
                device_id = device.device_id,
                "Device carries the reserved Other Rooms tag, treating it as unassigned"
            );
            continue;
        }

        match buckets.iter_mut().find(|b| b.room_tag == room_tag) {
            Some(bucket) => {
                if !bucket.device_ids.contains(&device.device_id) {
                    bucket.device_ids.push(device.device_id);
                }
            }
            None => buckets.push(RoomBucket {
                room_tag,
                device_ids: vec![device.device_id],
            }),
        }
    }

    buckets
}

/// Sum the member series of one room on the first member's time axis.
fn sum_room_series(
    bucket: &RoomBucket,
    series_by_device: &HashMap<i64, &[UsageSample]>,
) -> Vec<UsageSample> {
    // ---
    let members: Vec<&[UsageSample]> = bucket
        .device_ids
        .iter()
        .filter_map(|id| series_by_device.get(id).copied())
        .collect();

    match members.first() {
        Some(template) => sum_on_axis(template, &members),
        None => Vec::new(),
    }
}

/// Element-wise sum of `series` over the buckets of `template`.
fn sum_on_axis(template: &[UsageSample], series: &[&[UsageSample]]) -> Vec<UsageSample> {
    // ---
    template
        .iter()
        .enumerate()
        .map(|(i, bucket)| UsageSample {
            datetime: bucket.datetime,
            usage: series
                .iter()
                .fold(0.0, |acc, s| acc + Sample::at(s, i).or_zero()),
        })
        .collect()
}

/// Collapse all but the [`KEPT_ROOMS`] largest rooms into "Other Rooms".
fn collapse_overflow(mut rooms: Vec<RoomUsage>) -> Vec<RoomUsage> {
    // ---
    if rooms.len() <= MAX_ROOMS {
        return rooms;
    }

    rooms.sort_by(|a, b| compare_totals(a.total_usage, b.total_usage));
    let mut kept = rooms.split_off(rooms.len() - KEPT_ROOMS);
    let to_group = rooms;

    tracing::debug!(
        collapsed = to_group.len(),
        "Collapsing low-usage rooms into {}",
        OTHER_ROOMS_LABEL
    );

    // The lowest consumer supplies the time axis of the merged series.
    let template = to_group[0].usage.as_slice();
    let grouped: Vec<&[UsageSample]> = to_group.iter().map(|r| r.usage.as_slice()).collect();

    kept.push(RoomUsage {
        room_tag: OTHER_ROOMS_TAG,
        label: OTHER_ROOMS_LABEL.to_string(),
        total_usage: to_group.iter().fold(0.0, |acc, r| acc + r.total_usage),
        usage: sum_on_axis(template, &grouped),
    });
    kept
}

fn series_total(series: &[UsageSample]) -> f64 {
    series.iter().fold(0.0, |acc, s| acc + s.usage)
}

fn compare_totals(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn bucket_time(i: usize) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap() + Duration::days(i as i64)
    }

    fn device(device_id: i64, room_tag: Option<i64>) -> Device {
        // ---
        Device {
            device_id,
            name: format!("device-{device_id}"),
            room_tag,
            extra: Default::default(),
        }
    }

    fn series(device_id: i64, values: &[f64]) -> DeviceUsage {
        // ---
        DeviceUsage {
            device_id,
            usage: values
                .iter()
                .enumerate()
                .map(|(i, &usage)| UsageSample {
                    datetime: bucket_time(i),
                    usage,
                })
                .collect(),
        }
    }

    fn tag(tag_id: i64, name: &str) -> RoomTag {
        RoomTag {
            tag_id,
            name: name.to_string(),
        }
    }

    /// One device per room, each with a single bucket holding `total`.
    fn rooms_with_totals(totals: &[f64]) -> (Vec<Device>, Vec<DeviceUsage>) {
        // ---
        let devices = (0..totals.len())
            .map(|i| device(i as i64 + 1, Some(100 + i as i64)))
            .collect();
        let usage = totals
            .iter()
            .enumerate()
            .map(|(i, &t)| series(i as i64 + 1, &[t]))
            .collect();
        (devices, usage)
    }

    fn totals(rooms: &[RoomUsage]) -> Vec<f64> {
        rooms.iter().map(|r| r.total_usage).collect()
    }

    #[test]
    fn test_two_rooms_sorted_descending() {
        // ---
        let devices = vec![
            device(1, Some(10)),
            device(2, Some(10)),
            device(3, Some(20)),
        ];
        let usage = vec![
            series(1, &[2.0, 3.0]),
            series(2, &[1.0, 2.0]),
            series(3, &[15.0, 5.0]),
        ];
        let tags = vec![tag(10, "Kitchen"), tag(20, "Office")];

        let rooms = aggregate_usage_by_room(&devices, &tags, &usage);

        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_tag, 20);
        assert_eq!(rooms[0].label, "Office");
        assert_eq!(rooms[0].total_usage, 20.0);
        assert_eq!(rooms[1].room_tag, 10);
        assert_eq!(rooms[1].label, "Kitchen");
        assert_eq!(rooms[1].total_usage, 8.0);

        // Per-bucket sums stay on the input time axis
        let kitchen: Vec<f64> = rooms[1].usage.iter().map(|s| s.usage).collect();
        assert_eq!(kitchen, vec![3.0, 5.0]);
        assert_eq!(rooms[1].usage[1].datetime, bucket_time(1));
    }

    #[test]
    fn test_five_rooms_collapse_into_other_rooms() {
        // ---
        let (devices, usage) = rooms_with_totals(&[2.0, 40.0, 5.0, 50.0, 30.0]);

        let rooms = aggregate_usage_by_room(&devices, &[], &usage);

        assert_eq!(rooms.len(), 4);
        assert_eq!(totals(&rooms), vec![50.0, 40.0, 30.0, 7.0]);
        let other = &rooms[3];
        assert_eq!(other.room_tag, OTHER_ROOMS_TAG);
        assert_eq!(other.label, OTHER_ROOMS_LABEL);
        assert_eq!(other.usage.len(), 1);
        assert_eq!(other.usage[0].usage, 7.0);
    }

    #[test]
    fn test_other_rooms_pinned_last_even_when_largest() {
        // ---
        let (devices, usage) = rooms_with_totals(&[30.0, 30.0, 30.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let mut usage = usage;
        usage[3] = series(4, &[29.0]);

        let rooms = aggregate_usage_by_room(&devices, &[], &usage);

        assert_eq!(totals(&rooms), vec![30.0, 30.0, 30.0, 33.0]);
        assert!(rooms[3].is_other_rooms());
    }

    #[test]
    fn test_four_rooms_are_not_collapsed() {
        // ---
        let (devices, usage) = rooms_with_totals(&[1.0, 4.0, 3.0, 2.0]);

        let rooms = aggregate_usage_by_room(&devices, &[], &usage);

        assert_eq!(totals(&rooms), vec![4.0, 3.0, 2.0, 1.0]);
        assert!(rooms.iter().all(|r| !r.is_other_rooms()));
    }

    #[test]
    fn test_unassigned_devices_are_excluded() {
        // ---
        let devices = vec![
            device(1, Some(10)),
            device(2, None),
            device(3, Some(OTHER_ROOMS_TAG)),
        ];
        let usage = vec![
            series(1, &[1.0]),
            series(2, &[100.0]),
            series(3, &[50.0]),
        ];

        let rooms = aggregate_usage_by_room(&devices, &[], &usage);

        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].room_tag, 10);
        assert_eq!(rooms[0].total_usage, 1.0);
    }

    #[test]
    fn test_sum_is_preserved_across_collapse() {
        // ---
        let values = [
            [1.5, 2.0],
            [0.25, 0.0],
            [8.0, 1.0],
            [3.0, 3.0],
            [0.5, 0.5],
            [6.0, 2.0],
        ];
        let devices: Vec<Device> = (0..values.len())
            .map(|i| device(i as i64, Some((i % 6) as i64)))
            .collect();
        let usage: Vec<DeviceUsage> = values
            .iter()
            .enumerate()
            .map(|(i, v)| series(i as i64, v))
            .collect();
        let input_total: f64 = values.iter().flatten().sum();

        let rooms = aggregate_usage_by_room(&devices, &[], &usage);
        let output_total: f64 = totals(&rooms).iter().sum();

        assert_eq!(rooms.len(), 4);
        assert!((input_total - output_total).abs() < 1e-9);
        for room in &rooms {
            let series_sum: f64 = room.usage.iter().map(|s| s.usage).sum();
            assert!((room.total_usage - series_sum).abs() < 1e-9);
        }
    }

    #[test]
    fn test_room_without_usage_data_is_empty() {
        // ---
        let devices = vec![
            device(1, Some(10)),
            device(2, Some(20)),
            device(3, Some(20)),
        ];
        let usage = vec![series(2, &[4.0, 1.0])];
        let tags = vec![tag(20, "Garage")];

        let rooms = aggregate_usage_by_room(&devices, &tags, &usage);

        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_tag, 20);
        assert_eq!(rooms[0].total_usage, 5.0);
        assert_eq!(rooms[1].room_tag, 10);
        assert_eq!(rooms[1].label, "Room 10");
        assert_eq!(rooms[1].total_usage, 0.0);
        assert!(rooms[1].usage.is_empty());
    }

    #[test]
    fn test_short_series_contributes_zero_past_its_end() {
        // ---
        let devices = vec![device(1, Some(10)), device(2, Some(10))];
        let usage = vec![series(1, &[1.0, 1.0, 1.0]), series(2, &[5.0])];

        let rooms = aggregate_usage_by_room(&devices, &[], &usage);

        let values: Vec<f64> = rooms[0].usage.iter().map(|s| s.usage).collect();
        assert_eq!(values, vec![6.0, 1.0, 1.0]);
        assert_eq!(rooms[0].total_usage, 8.0);
    }

    #[test]
    fn test_collapse_uses_lowest_room_as_time_axis() {
        // ---
        // Rooms 1 and 2 are grouped; room 1 is the lowest and only has one bucket
        let devices: Vec<Device> = (1..=5).map(|i| device(i, Some(i))).collect();
        let usage = vec![
            series(1, &[1.0]),
            series(2, &[1.0, 1.0]),
            series(3, &[10.0, 10.0]),
            series(4, &[20.0, 20.0]),
            series(5, &[30.0, 30.0]),
        ];

        let rooms = aggregate_usage_by_room(&devices, &[], &usage);

        let other = &rooms[3];
        assert!(other.is_other_rooms());
        assert_eq!(other.usage.len(), 1);
        assert_eq!(other.usage[0].usage, 2.0);
        assert_eq!(other.total_usage, 3.0);
    }

    #[test]
    fn test_ties_keep_grouping_order() {
        // ---
        let devices = vec![
            device(1, Some(30)),
            device(2, Some(10)),
            device(3, Some(20)),
        ];
        let usage = vec![series(1, &[5.0]), series(2, &[5.0]), series(3, &[5.0])];

        let rooms = aggregate_usage_by_room(&devices, &[], &usage);

        let tags: Vec<i64> = rooms.iter().map(|r| r.room_tag).collect();
        assert_eq!(tags, vec![30, 10, 20]);
    }

    #[test]
    fn test_select_rooms_filters_devices() {
        // ---
        let devices = vec![
            device(1, Some(10)),
            device(2, Some(20)),
            device(3, None),
        ];

        let picked = select_rooms(&devices, &[20]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].device_id, 2);

        assert_eq!(select_rooms(&devices, &[]).len(), 3);
    }

    #[test]
    fn test_share_is_zero_when_total_is_zero() {
        // ---
        assert_eq!(usage_share(0.0, 0.0), 0.0);
        assert_eq!(usage_share(5.0, 0.0), 0.0);
        assert_eq!(usage_share(5.0, 20.0), 0.25);
        assert_eq!(usage_share(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn test_room_shares_sum_to_one() {
        // ---
        let (devices, usage) = rooms_with_totals(&[50.0, 40.0, 30.0, 5.0, 2.0]);
        let rooms = aggregate_usage_by_room(&devices, &[], &usage);

        let shares = room_shares(&rooms);
        let sum: f64 = shares.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((shares[0] - 50.0 / 127.0).abs() < 1e-9);

        let empty = room_shares(&aggregate_usage_by_room(&[device(1, Some(1))], &[], &[]));
        assert_eq!(empty, vec![0.0]);
    }

    #[test]
    fn test_sample_missing_reads_as_zero() {
        // ---
        let s = series(1, &[2.5]);
        assert_eq!(Sample::at(&s.usage, 0), Sample::Present(2.5));
        assert_eq!(Sample::at(&s.usage, 1), Sample::Missing);
        assert_eq!(Sample::Missing.or_zero(), 0.0);
    }
}
