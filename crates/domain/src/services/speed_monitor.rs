//! Speed-limit monitoring and violation statistics.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::models::{
    Alert, AlertPriority, AlertType, RouteEvent, SpeedViolation, TopViolator, Vehicle,
    ViolationStats,
};
use crate::models::speed_violation::DailyViolationCount;

/// How excess speed maps to alert priority.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeedPolicy {
    /// Excess (km/h over the limit) at which a violation is critical
    /// rather than a warning.
    #[serde(default = "default_critical_excess")]
    pub critical_excess_kmh: f64,
}

fn default_critical_excess() -> f64 {
    20.0
}

impl Default for SpeedPolicy {
    fn default() -> Self {
        Self {
            critical_excess_kmh: default_critical_excess(),
        }
    }
}

/// Everything produced by one excess-speed observation.
#[derive(Debug, Clone)]
pub struct SpeedCheck {
    pub event: RouteEvent,
    pub alert: Alert,
    pub violation: SpeedViolation,
}

/// Check the vehicle's current speed against its limit.
///
/// Returns `None` when the vehicle is at or under the limit. The check
/// never gates the position update that triggered it.
pub fn check_speed(vehicle: &Vehicle, at: DateTime<Utc>, policy: &SpeedPolicy) -> Option<SpeedCheck> {
    if vehicle.current_speed <= vehicle.speed_limit {
        return None;
    }

    let excess = vehicle.current_speed - vehicle.speed_limit;
    let priority = if excess >= policy.critical_excess_kmh {
        AlertPriority::Critical
    } else {
        AlertPriority::Warning
    };

    let event = RouteEvent::speed_violation(
        vehicle.latitude,
        vehicle.longitude,
        at,
        vehicle.current_speed,
        vehicle.speed_limit,
    );

    let message = format!(
        "Speed above limit: {:.0} km/h in a {:.0} km/h zone",
        vehicle.current_speed, vehicle.speed_limit
    );
    let mut alert = Alert::new(
        AlertType::Speed,
        priority,
        vehicle.id,
        vehicle.name.clone(),
        message,
        at,
    )
    .at_position(vehicle.latitude, vehicle.longitude);
    alert.speed = Some(vehicle.current_speed);
    alert.speed_limit = Some(vehicle.speed_limit);

    let violation = SpeedViolation {
        id: Uuid::new_v4(),
        vehicle_id: vehicle.id,
        vehicle_name: vehicle.name.clone(),
        speed: vehicle.current_speed,
        speed_limit: vehicle.speed_limit,
        excess_speed: excess,
        timestamp: at,
        latitude: vehicle.latitude,
        longitude: vehicle.longitude,
    };

    Some(SpeedCheck {
        event,
        alert,
        violation,
    })
}

/// Number of vehicles kept in the violation leaderboard.
const TOP_VIOLATORS: usize = 10;

/// Aggregate a set of violations into report statistics.
pub fn violation_stats(violations: &[SpeedViolation]) -> ViolationStats {
    struct PerVehicle {
        name: String,
        count: usize,
        total_excess: f64,
        last_violation: DateTime<Utc>,
    }

    let mut by_vehicle: HashMap<Uuid, PerVehicle> = HashMap::new();
    let mut by_day: BTreeMap<chrono::NaiveDate, usize> = BTreeMap::new();
    let mut total_excess = 0.0;

    for violation in violations {
        total_excess += violation.excess_speed;
        *by_day.entry(violation.timestamp.date_naive()).or_default() += 1;

        by_vehicle
            .entry(violation.vehicle_id)
            .and_modify(|entry| {
                entry.count += 1;
                entry.total_excess += violation.excess_speed;
                if violation.timestamp > entry.last_violation {
                    entry.last_violation = violation.timestamp;
                }
            })
            .or_insert_with(|| PerVehicle {
                name: violation.vehicle_name.clone(),
                count: 1,
                total_excess: violation.excess_speed,
                last_violation: violation.timestamp,
            });
    }

    let vehicles_with_violations = by_vehicle.len();
    let mut top_violators: Vec<TopViolator> = by_vehicle
        .into_iter()
        .map(|(vehicle_id, entry)| TopViolator {
            vehicle_id,
            vehicle_name: entry.name,
            total_violations: entry.count,
            average_excess_speed: entry.total_excess / entry.count as f64,
            last_violation: entry.last_violation,
        })
        .collect();
    top_violators.sort_by(|a, b| b.total_violations.cmp(&a.total_violations));
    top_violators.truncate(TOP_VIOLATORS);

    ViolationStats {
        total_violations: violations.len(),
        vehicles_with_violations,
        average_excess_speed: if violations.is_empty() {
            0.0
        } else {
            total_excess / violations.len() as f64
        },
        violations_by_day: by_day
            .into_iter()
            .map(|(date, count)| DailyViolationCount { date, count })
            .collect(),
        top_violators,
    }
}
