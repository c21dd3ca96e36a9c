//! Domain services for Fleet Tracker.
//!
//! Services contain the business logic that operates on domain models.

pub mod geofence_monitor;
pub mod segmentation;
pub mod speed_monitor;

pub use geofence_monitor::{
    evaluate_position, zone_contains, GeofenceTransition, ZoneState, ZoneStates,
};
pub use segmentation::{SegmentationConfig, TripSegmenter};
pub use speed_monitor::{check_speed, violation_stats, SpeedCheck, SpeedPolicy};
