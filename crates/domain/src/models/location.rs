//! Location domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::vehicle::{IgnitionState, VehicleStatus};

/// One immutable position sample inside a trip.
///
/// The `timestamp` is the ordering key: streams handed to segmentation must
/// be non-decreasing in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported speed in km/h.
    pub speed: f64,
    pub heading: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// A durable position-history record, appended once per ingested fix and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub license_plate: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Reported speed in km/h.
    pub speed: f64,
    pub heading: f64,
    pub accuracy: f64,
    pub status: VehicleStatus,
    pub ignition: IgnitionState,
    pub recorded_at: DateTime<Utc>,
}

impl TrackPoint {
    /// Project the record into the sample shape consumed by segmentation.
    pub fn to_location_point(&self) -> LocationPoint {
        LocationPoint {
            latitude: self.latitude,
            longitude: self.longitude,
            speed: self.speed,
            heading: self.heading,
            timestamp: self.recorded_at,
            accuracy: Some(self.accuracy),
        }
    }
}

/// Raw fix reported by a vehicle's GPS unit.
///
/// A missing `timestamp` means "now" as seen by the ingest coordinator.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackingFix {
    #[validate(custom(function = "crate::models::vehicle::validate_license_plate"))]
    pub license_plate: String,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    /// Reported speed in km/h.
    #[validate(custom(function = "shared::validation::validate_speed"))]
    pub current_speed: f64,

    #[validate(custom(function = "shared::validation::validate_heading"))]
    pub heading: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_accuracy"))]
    pub accuracy: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_battery_level"))]
    pub battery_level: Option<i32>,

    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_fix() -> TrackingFix {
        TrackingFix {
            license_plate: "ABC-1234".to_string(),
            latitude: -23.5505,
            longitude: -46.6333,
            current_speed: 72.0,
            heading: Some(45.0),
            accuracy: Some(5.0),
            battery_level: Some(85),
            timestamp: None,
        }
    }

    #[test]
    fn test_tracking_fix_valid() {
        assert!(valid_fix().validate().is_ok());
    }

    #[test]
    fn test_tracking_fix_deserialization() {
        let json = r#"{
            "licensePlate": "ABC-1234",
            "latitude": -23.5505,
            "longitude": -46.6333,
            "currentSpeed": 72.0
        }"#;
        let fix: TrackingFix = serde_json::from_str(json).unwrap();
        assert_eq!(fix.license_plate, "ABC-1234");
        assert_eq!(fix.current_speed, 72.0);
        assert!(fix.heading.is_none());
        assert!(fix.timestamp.is_none());
        assert!(fix.validate().is_ok());
    }

    #[test]
    fn test_tracking_fix_invalid_latitude() {
        let mut fix = valid_fix();
        fix.latitude = 95.0;
        assert!(fix.validate().is_err());
    }

    #[test]
    fn test_tracking_fix_non_finite_longitude() {
        let mut fix = valid_fix();
        fix.longitude = f64::NAN;
        assert!(fix.validate().is_err());
    }

    #[test]
    fn test_tracking_fix_negative_speed() {
        let mut fix = valid_fix();
        fix.current_speed = -3.0;
        assert!(fix.validate().is_err());
    }

    #[test]
    fn test_tracking_fix_bad_plate() {
        let mut fix = valid_fix();
        fix.license_plate = "!".to_string();
        assert!(fix.validate().is_err());
    }

    #[test]
    fn test_tracking_fix_optional_field_validation() {
        let mut fix = valid_fix();
        fix.heading = Some(400.0);
        assert!(fix.validate().is_err());

        let mut fix = valid_fix();
        fix.battery_level = Some(150);
        assert!(fix.validate().is_err());
    }

    #[test]
    fn test_track_point_projection() {
        let recorded_at = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        let record = TrackPoint {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            license_plate: "ABC-1234".to_string(),
            latitude: -23.5505,
            longitude: -46.6333,
            speed: 40.0,
            heading: 45.0,
            accuracy: 5.0,
            status: VehicleStatus::Moving,
            ignition: IgnitionState::On,
            recorded_at,
        };

        let point = record.to_location_point();
        assert_eq!(point.latitude, record.latitude);
        assert_eq!(point.speed, 40.0);
        assert_eq!(point.timestamp, recorded_at);
        assert_eq!(point.accuracy, Some(5.0));
    }

    #[test]
    fn test_location_point_serialization() {
        let point = LocationPoint {
            latitude: -23.5505,
            longitude: -46.6333,
            speed: 40.0,
            heading: 180.0,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap(),
            accuracy: None,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("\"speed\":40"));
        assert!(!json.contains("accuracy"));
    }
}
