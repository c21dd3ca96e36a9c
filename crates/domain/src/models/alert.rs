//! Alert domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Category of an alert surfaced to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Speed,
    GeofenceEntry,
    GeofenceExit,
    GeofenceDwell,
    System,
}

impl AlertType {
    /// Returns the string representation for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Speed => "speed",
            AlertType::GeofenceEntry => "geofence_entry",
            AlertType::GeofenceExit => "geofence_exit",
            AlertType::GeofenceDwell => "geofence_dwell",
            AlertType::System => "system",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Critical,
    Warning,
    Info,
}

impl AlertPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPriority::Critical => "critical",
            AlertPriority::Warning => "warning",
            AlertPriority::Info => "info",
        }
    }
}

impl fmt::Display for AlertPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An operator-facing notification produced by trip or geofence evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub vehicle_id: Uuid,
    pub vehicle_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geofence_name: Option<String>,
}

impl Alert {
    /// Create an unread alert with no positional context.
    pub fn new(
        alert_type: AlertType,
        priority: AlertPriority,
        vehicle_id: Uuid,
        vehicle_name: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            alert_type,
            priority,
            vehicle_id,
            vehicle_name: vehicle_name.into(),
            message: message.into(),
            timestamp,
            read: false,
            latitude: None,
            longitude: None,
            speed: None,
            speed_limit: None,
            geofence_name: None,
        }
    }

    /// Attach the position the alert was raised at.
    pub fn at_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}
