//! Geofence domain model.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::DomainError;

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Geometric extent of a geofence.
///
/// Circles carry a center and radius; polygons an ordered vertex ring. The
/// tagged representation makes "center+radius iff circle" structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeofenceZone {
    Circle {
        center: Coordinates,
        /// Radius in meters.
        radius: f64,
    },
    Polygon {
        points: Vec<Coordinates>,
    },
}

impl GeofenceZone {
    /// Validate the zone geometry.
    ///
    /// Polygons are treated as simple closed rings; a self-intersecting
    /// ring is accepted with a warning and evaluated best-effort.
    pub fn validate(&self, name: &str) -> Result<(), DomainError> {
        match self {
            GeofenceZone::Circle { center, radius } => {
                if !center.is_finite() {
                    return Err(DomainError::Validation(format!(
                        "geofence '{name}': circle center must be finite"
                    )));
                }
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(DomainError::Validation(format!(
                        "geofence '{name}': circle radius must be positive"
                    )));
                }
            }
            GeofenceZone::Polygon { points } => {
                if points.len() < 3 {
                    return Err(DomainError::Validation(format!(
                        "geofence '{name}': polygon needs at least 3 vertices"
                    )));
                }
                if points.iter().any(|p| !p.is_finite()) {
                    return Err(DomainError::Validation(format!(
                        "geofence '{name}': polygon vertices must be finite"
                    )));
                }
                if ring_self_intersects(points) {
                    tracing::warn!(
                        geofence = name,
                        "polygon ring self-intersects; containment is best-effort"
                    );
                }
            }
        }
        Ok(())
    }
}

/// Signed area of the triangle (a, b, c); sign gives the turn direction.
fn orientation(a: Coordinates, b: Coordinates, c: Coordinates) -> f64 {
    (b.longitude - a.longitude) * (c.latitude - a.latitude)
        - (b.latitude - a.latitude) * (c.longitude - a.longitude)
}

fn segments_cross(p1: Coordinates, p2: Coordinates, q1: Coordinates, q2: Coordinates) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Pairwise check for properly crossing non-adjacent ring edges.
fn ring_self_intersects(points: &[Coordinates]) -> bool {
    let n = points.len();
    for i in 0..n {
        for j in (i + 1)..n {
            // adjacent edges share an endpoint and may not "cross"
            if j == (i + 1) % n || (j + 1) % n == i {
                continue;
            }
            if segments_cross(points[i], points[(i + 1) % n], points[j], points[(j + 1) % n]) {
                return true;
            }
        }
    }
    false
}

/// Kind of rule attached to a geofence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeofenceRuleType {
    Entry,
    Exit,
    Dwell,
    TimeViolation,
}

impl GeofenceRuleType {
    /// Returns the string representation for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeofenceRuleType::Entry => "entry",
            GeofenceRuleType::Exit => "exit",
            GeofenceRuleType::Dwell => "dwell",
            GeofenceRuleType::TimeViolation => "time_violation",
        }
    }
}

impl fmt::Display for GeofenceRuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single rule on a geofence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceRule {
    #[serde(rename = "type")]
    pub rule_type: GeofenceRuleType,
    pub enabled: bool,
    /// Minutes of continuous presence before a dwell rule fires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dwell_time_minutes: Option<u32>,
    /// Debounce window: a boundary crossing must persist this long before
    /// it is treated as real rather than GPS jitter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance_seconds: Option<u32>,
    /// Start of the allowed occupation window (time_violation rules).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    /// End of the allowed occupation window (time_violation rules).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
}

impl GeofenceRule {
    pub fn entry(tolerance_seconds: u32) -> Self {
        Self {
            rule_type: GeofenceRuleType::Entry,
            enabled: true,
            dwell_time_minutes: None,
            tolerance_seconds: Some(tolerance_seconds),
            start_time: None,
            end_time: None,
        }
    }

    pub fn exit(tolerance_seconds: u32) -> Self {
        Self {
            rule_type: GeofenceRuleType::Exit,
            ..Self::entry(tolerance_seconds)
        }
    }

    pub fn dwell(dwell_time_minutes: u32, tolerance_seconds: u32) -> Self {
        Self {
            rule_type: GeofenceRuleType::Dwell,
            dwell_time_minutes: Some(dwell_time_minutes),
            ..Self::entry(tolerance_seconds)
        }
    }

    pub fn time_window(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            rule_type: GeofenceRuleType::TimeViolation,
            enabled: true,
            dwell_time_minutes: None,
            tolerance_seconds: None,
            start_time: Some(start_time),
            end_time: Some(end_time),
        }
    }
}

/// A monitored area with transition rules and assigned vehicles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub zone: GeofenceZone,
    pub active: bool,
    pub rules: Vec<GeofenceRule>,
    pub vehicle_ids: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_triggered: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Geofence {
    /// Whether this geofence is evaluated for the given vehicle.
    pub fn applies_to(&self, vehicle_id: Uuid) -> bool {
        self.active && self.vehicle_ids.contains(&vehicle_id)
    }

    /// The enabled rule of the given kind, if any.
    pub fn rule(&self, rule_type: GeofenceRuleType) -> Option<&GeofenceRule> {
        self.rules
            .iter()
            .find(|r| r.rule_type == rule_type && r.enabled)
    }

    /// Validate the zone geometry (see [`GeofenceZone::validate`]).
    pub fn validate_zone(&self) -> Result<(), DomainError> {
        self.zone.validate(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Coordinates> {
        vec![
            Coordinates::new(-23.5200, -46.6400),
            Coordinates::new(-23.5200, -46.6200),
            Coordinates::new(-23.5350, -46.6200),
            Coordinates::new(-23.5350, -46.6400),
        ]
    }

    fn circle_fence() -> Geofence {
        Geofence {
            id: Uuid::new_v4(),
            name: "Central Depot".to_string(),
            description: Some("Main loading area".to_string()),
            zone: GeofenceZone::Circle {
                center: Coordinates::new(-23.5505, -46.6333),
                radius: 500.0,
            },
            active: true,
            rules: vec![GeofenceRule::entry(30), GeofenceRule::exit(30)],
            vehicle_ids: vec![Uuid::new_v4()],
            last_triggered: None,
            color: Some("#22c55e".to_string()),
        }
    }

    #[test]
    fn test_circle_serialization_is_flat() {
        let json = serde_json::to_string(&circle_fence()).unwrap();
        assert!(json.contains("\"type\":\"circle\""));
        assert!(json.contains("\"radius\":500"));
        assert!(json.contains("\"center\""));
        assert!(!json.contains("\"zone\""));
    }

    #[test]
    fn test_polygon_deserialization() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "name": "North Delivery Zone",
            "type": "polygon",
            "points": [
                {"latitude": -23.52, "longitude": -46.64},
                {"latitude": -23.52, "longitude": -46.62},
                {"latitude": -23.535, "longitude": -46.62}
            ],
            "active": true,
            "rules": [{"type": "entry", "enabled": true, "toleranceSeconds": 60}],
            "vehicleIds": []
        }"#;

        let fence: Geofence = serde_json::from_str(json).unwrap();
        match &fence.zone {
            GeofenceZone::Polygon { points } => assert_eq!(points.len(), 3),
            other => panic!("expected polygon, got {other:?}"),
        }
        assert!(fence.validate_zone().is_ok());
    }

    #[test]
    fn test_rule_type_serde() {
        let json = serde_json::to_string(&GeofenceRuleType::TimeViolation).unwrap();
        assert_eq!(json, "\"time_violation\"");
        let parsed: GeofenceRuleType = serde_json::from_str("\"dwell\"").unwrap();
        assert_eq!(parsed, GeofenceRuleType::Dwell);
    }

    #[test]
    fn test_applies_to() {
        let mut fence = circle_fence();
        let assigned = fence.vehicle_ids[0];
        assert!(fence.applies_to(assigned));
        assert!(!fence.applies_to(Uuid::new_v4()));

        fence.active = false;
        assert!(!fence.applies_to(assigned));
    }

    #[test]
    fn test_rule_lookup_skips_disabled() {
        let mut fence = circle_fence();
        assert!(fence.rule(GeofenceRuleType::Entry).is_some());
        assert!(fence.rule(GeofenceRuleType::Dwell).is_none());

        fence.rules[0].enabled = false;
        assert!(fence.rule(GeofenceRuleType::Entry).is_none());
    }

    #[test]
    fn test_circle_validation() {
        let mut fence = circle_fence();
        assert!(fence.validate_zone().is_ok());

        fence.zone = GeofenceZone::Circle {
            center: Coordinates::new(-23.5505, -46.6333),
            radius: 0.0,
        };
        assert!(fence.validate_zone().is_err());

        fence.zone = GeofenceZone::Circle {
            center: Coordinates::new(f64::NAN, -46.6333),
            radius: 500.0,
        };
        assert!(fence.validate_zone().is_err());
    }

    #[test]
    fn test_polygon_validation_requires_three_vertices() {
        let zone = GeofenceZone::Polygon {
            points: square()[..2].to_vec(),
        };
        assert!(zone.validate("test").is_err());

        let zone = GeofenceZone::Polygon { points: square() };
        assert!(zone.validate("test").is_ok());
    }

    #[test]
    fn test_simple_ring_does_not_self_intersect() {
        assert!(!ring_self_intersects(&square()));
    }

    #[test]
    fn test_bowtie_ring_self_intersects() {
        // Hourglass: edge 0-1 crosses edge 2-3.
        let bowtie = vec![
            Coordinates::new(0.0, 0.0),
            Coordinates::new(1.0, 1.0),
            Coordinates::new(0.0, 1.0),
            Coordinates::new(1.0, 0.0),
        ];
        assert!(ring_self_intersects(&bowtie));

        // Still accepted, only warned about.
        let zone = GeofenceZone::Polygon { points: bowtie };
        assert!(zone.validate("bowtie").is_ok());
    }
}
