//! Domain models for Fleet Tracker.

pub mod alert;
pub mod geofence;
pub mod location;
pub mod route_event;
pub mod speed_violation;
pub mod trip;
pub mod vehicle;

pub use alert::{Alert, AlertPriority, AlertType};
pub use geofence::{Coordinates, Geofence, GeofenceRule, GeofenceRuleType, GeofenceZone};
pub use location::{LocationPoint, TrackPoint, TrackingFix};
pub use route_event::{RouteEvent, RouteEventType};
pub use speed_violation::{SpeedViolation, TopViolator, ViolationStats};
pub use trip::Trip;
pub use vehicle::{IgnitionState, Vehicle, VehicleStatus};
