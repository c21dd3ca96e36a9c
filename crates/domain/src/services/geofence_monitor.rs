//! Geofence containment and transition evaluation.
//!
//! Containment is a pure geometric test; transitions are derived against
//! per-(vehicle, geofence) debounce state so momentary GPS jitter across a
//! boundary never fires an event.

use chrono::{DateTime, Duration, Utc};
use geo::{Contains, LineString, Point, Polygon};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Coordinates, Geofence, GeofenceRuleType, GeofenceZone};
use shared::geo::haversine_distance;

/// Whether `position` lies inside the zone.
///
/// Circles compare the great-circle distance to the radius; polygons use
/// ray casting over the vertex ring (even-odd semantics, which is also the
/// best-effort answer for self-intersecting rings).
pub fn zone_contains(zone: &GeofenceZone, position: Coordinates) -> bool {
    match zone {
        GeofenceZone::Circle { center, radius } => {
            haversine_distance(
                position.latitude,
                position.longitude,
                center.latitude,
                center.longitude,
            ) <= *radius
        }
        GeofenceZone::Polygon { points } => {
            if points.len() < 3 {
                return false;
            }
            let ring: Vec<(f64, f64)> =
                points.iter().map(|c| (c.longitude, c.latitude)).collect();
            let polygon = Polygon::new(LineString::from(ring), vec![]);
            polygon.contains(&Point::new(position.longitude, position.latitude))
        }
    }
}

/// Debounce state for one (vehicle, geofence) pair.
///
/// `flip_pending_since` holds the timestamp of the last fix that agreed
/// with the confirmed state — a plain inside/outside boolean cannot
/// implement the tolerance window.
#[derive(Debug, Clone)]
pub struct ZoneState {
    inside: bool,
    flip_pending_since: Option<DateTime<Utc>>,
    last_agreed_at: DateTime<Utc>,
    entered_at: Option<DateTime<Utc>>,
    dwell_fired: bool,
    window_violation_fired: bool,
}

impl ZoneState {
    /// Baseline state from the first observation of the pair. Seeding
    /// never fires an event: pre-existing presence is indistinguishable
    /// from an entry at this point.
    fn seed(inside: bool, at: DateTime<Utc>) -> Self {
        Self {
            inside,
            flip_pending_since: None,
            last_agreed_at: at,
            entered_at: inside.then_some(at),
            dwell_fired: false,
            window_violation_fired: false,
        }
    }

    /// Confirmed containment.
    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

/// Per-vehicle debounce state, keyed by geofence id.
pub type ZoneStates = HashMap<Uuid, ZoneState>;

/// A confirmed transition for one vehicle against one geofence.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceTransition {
    pub geofence_id: Uuid,
    pub geofence_name: String,
    pub kind: GeofenceRuleType,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

fn transition(
    geofence: &Geofence,
    kind: GeofenceRuleType,
    position: Coordinates,
    timestamp: DateTime<Utc>,
) -> GeofenceTransition {
    GeofenceTransition {
        geofence_id: geofence.id,
        geofence_name: geofence.name.clone(),
        kind,
        timestamp,
        latitude: position.latitude,
        longitude: position.longitude,
    }
}

/// Evaluate one fix against a vehicle's geofences, updating `states` and
/// returning the transitions confirmed by this fix.
///
/// `geofences` is expected to be pre-filtered to the fences assigned to the
/// vehicle; inactive fences are skipped regardless.
pub fn evaluate_position(
    position: Coordinates,
    timestamp: DateTime<Utc>,
    geofences: &[Geofence],
    states: &mut ZoneStates,
) -> Vec<GeofenceTransition> {
    let mut transitions = Vec::new();

    for geofence in geofences {
        if !geofence.active {
            continue;
        }
        let raw_inside = zone_contains(&geofence.zone, position);

        let state = match states.get_mut(&geofence.id) {
            Some(state) => state,
            None => {
                states.insert(geofence.id, ZoneState::seed(raw_inside, timestamp));
                continue;
            }
        };

        if raw_inside == state.inside {
            state.last_agreed_at = timestamp;
            state.flip_pending_since = None;
        } else {
            let pending_since = *state.flip_pending_since.get_or_insert(state.last_agreed_at);
            let direction = if raw_inside {
                GeofenceRuleType::Entry
            } else {
                GeofenceRuleType::Exit
            };
            let tolerance = geofence
                .rule(direction)
                .and_then(|r| r.tolerance_seconds)
                .unwrap_or(0);

            if timestamp - pending_since >= Duration::seconds(i64::from(tolerance)) {
                state.inside = raw_inside;
                state.last_agreed_at = timestamp;
                state.flip_pending_since = None;
                state.entered_at = raw_inside.then_some(timestamp);
                state.dwell_fired = false;
                state.window_violation_fired = false;

                if geofence.rule(direction).is_some() {
                    transitions.push(transition(geofence, direction, position, timestamp));
                }
            }
        }

        if state.inside {
            // Dwell fires once per continuous inside interval.
            if let Some(rule) = geofence.rule(GeofenceRuleType::Dwell) {
                if !state.dwell_fired {
                    if let (Some(entered_at), Some(minutes)) =
                        (state.entered_at, rule.dwell_time_minutes)
                    {
                        if timestamp - entered_at >= Duration::minutes(i64::from(minutes)) {
                            state.dwell_fired = true;
                            transitions.push(transition(
                                geofence,
                                GeofenceRuleType::Dwell,
                                position,
                                timestamp,
                            ));
                        }
                    }
                }
            }

            // Occupation outside the allowed window fires once per
            // excursion and re-arms when back inside the window.
            if let Some(rule) = geofence.rule(GeofenceRuleType::TimeViolation) {
                if let (Some(start), Some(end)) = (rule.start_time, rule.end_time) {
                    let time_of_day = timestamp.time();
                    let allowed = if start <= end {
                        time_of_day >= start && time_of_day <= end
                    } else {
                        // window wraps midnight
                        time_of_day >= start || time_of_day <= end
                    };
                    if allowed {
                        state.window_violation_fired = false;
                    } else if !state.window_violation_fired {
                        state.window_violation_fired = true;
                        transitions.push(transition(
                            geofence,
                            GeofenceRuleType::TimeViolation,
                            position,
                            timestamp,
                        ));
                    }
                }
            }
        }
    }

    transitions
}
