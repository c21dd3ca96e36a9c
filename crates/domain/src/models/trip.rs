//! Trip domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::location::LocationPoint;
use super::route_event::RouteEvent;

/// A journey reconstructed from one vehicle's position stream, bounded by
/// idle gaps. Immutable after finalization.
///
/// Invariants held by construction:
/// - `start_time` / `end_time` equal the first / last point's timestamp
/// - `stops_count` equals the number of stop events
/// - `travel_time_minutes` is the wall-clock span including stopped time
/// - `average_speed_kmh` is distance over moving time, `0` when the trip
///   never moved
/// - `events` is sorted ascending by timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_distance_meters: f64,
    pub travel_time_minutes: f64,
    pub stopped_time_minutes: f64,
    pub average_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub stops_count: usize,
    pub points: Vec<LocationPoint>,
    pub events: Vec<RouteEvent>,
}

impl Trip {
    /// Time spent moving, in minutes.
    pub fn movement_time_minutes(&self) -> f64 {
        self.travel_time_minutes - self.stopped_time_minutes
    }

    /// Whether the trip overlaps the given time range.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time <= end && self.end_time >= start
    }
}
