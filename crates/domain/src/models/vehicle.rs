//! Vehicle domain model.

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::ValidationError;

use super::location::TrackingFix;

/// Speed above which a vehicle counts as moving rather than idling, km/h.
pub const MOVING_SPEED_THRESHOLD_KMH: f64 = 5.0;

/// Speed limit assigned to vehicles created from their first fix, km/h.
pub const DEFAULT_SPEED_LIMIT_KMH: f64 = 80.0;

/// GPS accuracy assumed when a fix does not report one, meters.
pub const DEFAULT_ACCURACY_METERS: f64 = 5.0;

lazy_static! {
    static ref LICENSE_PLATE: Regex =
        Regex::new(r"^[A-Z0-9][A-Z0-9 -]{0,18}[A-Z0-9]$").expect("license plate pattern");
}

// ============================================================================
// Status Enums
// ============================================================================

/// Live movement status of a vehicle.
///
/// `Offline` is never derived from a fix; it is assigned by the staleness
/// sweep based on elapsed time since the last update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Moving,
    Stopped,
    Idle,
    Offline,
}

impl VehicleStatus {
    /// Returns the string representation for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Moving => "moving",
            VehicleStatus::Stopped => "stopped",
            VehicleStatus::Idle => "idle",
            VehicleStatus::Offline => "offline",
        }
    }

    /// Derive the status from a reported speed in km/h.
    pub fn from_speed(speed_kmh: f64) -> Self {
        if speed_kmh > MOVING_SPEED_THRESHOLD_KMH {
            VehicleStatus::Moving
        } else if speed_kmh > 0.0 {
            VehicleStatus::Idle
        } else {
            VehicleStatus::Stopped
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "moving" => Ok(VehicleStatus::Moving),
            "stopped" => Ok(VehicleStatus::Stopped),
            "idle" => Ok(VehicleStatus::Idle),
            "offline" => Ok(VehicleStatus::Offline),
            _ => Err(format!(
                "Invalid vehicle status: {}. Must be one of: moving, stopped, idle, offline",
                s
            )),
        }
    }
}

/// Ignition state inferred from the reported speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IgnitionState {
    On,
    Off,
}

impl IgnitionState {
    /// Returns the string representation for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnitionState::On => "on",
            IgnitionState::Off => "off",
        }
    }

    /// Derive the ignition state from a reported speed in km/h.
    pub fn from_speed(speed_kmh: f64) -> Self {
        if speed_kmh > 0.0 {
            IgnitionState::On
        } else {
            IgnitionState::Off
        }
    }
}

impl fmt::Display for IgnitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IgnitionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(IgnitionState::On),
            "off" => Ok(IgnitionState::Off),
            _ => Err(format!("Invalid ignition state: {}. Must be on or off", s)),
        }
    }
}

// ============================================================================
// Plate helpers
// ============================================================================

/// Normalize a license plate for case-insensitive matching.
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

/// Validates a license plate: 2-20 characters, alphanumeric with inner
/// spaces or dashes, compared case-insensitively.
pub fn validate_license_plate(plate: &str) -> Result<(), ValidationError> {
    if LICENSE_PLATE.is_match(&normalize_plate(plate)) {
        Ok(())
    } else {
        let mut err = ValidationError::new("license_plate_format");
        err.message = Some("License plate must be 2-20 alphanumeric characters".into());
        Err(err)
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// Live state of a tracked vehicle, mutated in place by each incoming fix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub license_plate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub status: VehicleStatus,
    pub ignition: IgnitionState,
    pub current_speed: f64,
    pub speed_limit: f64,
    pub heading: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub last_update: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<i32>,
}

impl Vehicle {
    /// Create a vehicle from the first fix seen for an unknown plate.
    ///
    /// The plate doubles as the display name until an operator renames the
    /// vehicle.
    pub fn from_first_fix(fix: &TrackingFix, at: DateTime<Utc>) -> Self {
        let plate = normalize_plate(&fix.license_plate);
        Self {
            id: Uuid::new_v4(),
            name: plate.clone(),
            license_plate: plate,
            model: None,
            status: VehicleStatus::from_speed(fix.current_speed),
            ignition: IgnitionState::from_speed(fix.current_speed),
            current_speed: fix.current_speed,
            speed_limit: DEFAULT_SPEED_LIMIT_KMH,
            heading: fix.heading.unwrap_or(0.0),
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy: fix.accuracy.unwrap_or(DEFAULT_ACCURACY_METERS),
            last_update: at,
            battery_level: fix.battery_level,
        }
    }

    /// Apply a subsequent fix in place.
    pub fn apply_fix(&mut self, fix: &TrackingFix, at: DateTime<Utc>) {
        self.latitude = fix.latitude;
        self.longitude = fix.longitude;
        self.current_speed = fix.current_speed;
        self.status = VehicleStatus::from_speed(fix.current_speed);
        self.ignition = IgnitionState::from_speed(fix.current_speed);
        if let Some(heading) = fix.heading {
            self.heading = heading;
        }
        if let Some(accuracy) = fix.accuracy {
            self.accuracy = accuracy;
        }
        if let Some(level) = fix.battery_level {
            self.battery_level = Some(level);
        }
        self.last_update = at;
    }

    /// Case-insensitive plate match.
    pub fn matches_plate(&self, plate: &str) -> bool {
        self.license_plate.eq_ignore_ascii_case(normalize_plate(plate).as_str())
    }

    /// Whether the vehicle has not reported within `threshold`.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        now - self.last_update > threshold
    }
}
