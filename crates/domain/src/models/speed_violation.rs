//! Speed violation records and aggregate statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recorded excess-speed observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedViolation {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub vehicle_name: String,
    /// Observed speed, km/h.
    pub speed: f64,
    /// Limit in force, km/h.
    pub speed_limit: f64,
    /// `speed - speed_limit`, km/h.
    pub excess_speed: f64,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Violations on a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyViolationCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Per-vehicle violation summary for the report's leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopViolator {
    pub vehicle_id: Uuid,
    pub vehicle_name: String,
    pub total_violations: usize,
    pub average_excess_speed: f64,
    pub last_violation: DateTime<Utc>,
}

/// Aggregate view over a set of violations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationStats {
    pub total_violations: usize,
    pub vehicles_with_violations: usize,
    pub average_excess_speed: f64,
    pub violations_by_day: Vec<DailyViolationCount>,
    pub top_violators: Vec<TopViolator>,
}
