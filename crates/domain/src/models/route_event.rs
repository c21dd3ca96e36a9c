//! Route event domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of event recorded on a trip's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteEventType {
    Departure,
    Arrival,
    Stop,
    SpeedViolation,
    GeofenceEntry,
    GeofenceExit,
}

impl RouteEventType {
    /// Returns the string representation for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteEventType::Departure => "departure",
            RouteEventType::Arrival => "arrival",
            RouteEventType::Stop => "stop",
            RouteEventType::SpeedViolation => "speed_violation",
            RouteEventType::GeofenceEntry => "geofence_entry",
            RouteEventType::GeofenceExit => "geofence_exit",
        }
    }
}

impl fmt::Display for RouteEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One event on a trip timeline, immutable once appended.
///
/// Event lists are sorted by `timestamp` during trip finalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEvent {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: RouteEventType,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    /// Stop duration in minutes; only present on stop events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geofence_name: Option<String>,
    /// Reverse-geocoded address, filled in by an external enrichment step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl RouteEvent {
    fn base(event_type: RouteEventType, latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            latitude,
            longitude,
            timestamp,
            duration_minutes: None,
            speed: None,
            speed_limit: None,
            geofence_name: None,
            address: None,
        }
    }

    /// Trip start marker at the first point of a trip.
    pub fn departure(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self::base(RouteEventType::Departure, latitude, longitude, timestamp)
    }

    /// Trip end marker at the last point of a trip.
    pub fn arrival(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self::base(RouteEventType::Arrival, latitude, longitude, timestamp)
    }

    /// A surfaced stop: `started_at` is when the vehicle slowed below the
    /// stop threshold, `duration_minutes` how long it remained there.
    pub fn stop(
        latitude: f64,
        longitude: f64,
        started_at: DateTime<Utc>,
        duration_minutes: f64,
    ) -> Self {
        Self {
            duration_minutes: Some(duration_minutes),
            ..Self::base(RouteEventType::Stop, latitude, longitude, started_at)
        }
    }

    pub fn speed_violation(
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
        speed: f64,
        speed_limit: f64,
    ) -> Self {
        Self {
            speed: Some(speed),
            speed_limit: Some(speed_limit),
            ..Self::base(RouteEventType::SpeedViolation, latitude, longitude, timestamp)
        }
    }

    pub fn geofence_entry(
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
        geofence_name: impl Into<String>,
    ) -> Self {
        Self {
            geofence_name: Some(geofence_name.into()),
            ..Self::base(RouteEventType::GeofenceEntry, latitude, longitude, timestamp)
        }
    }

    pub fn geofence_exit(
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
        geofence_name: impl Into<String>,
    ) -> Self {
        Self {
            geofence_name: Some(geofence_name.into()),
            ..Self::base(RouteEventType::GeofenceExit, latitude, longitude, timestamp)
        }
    }
}
