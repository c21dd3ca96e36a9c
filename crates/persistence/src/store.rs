//! Store traits consumed by the tracking core.
//!
//! The concrete backend (in-memory here, a relational store elsewhere) is
//! chosen once at startup and injected; callers only see these traits.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use domain::models::{Alert, Geofence, TrackPoint, Trip, Vehicle};

/// Failures raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Observer for live vehicle changes.
///
/// A store either supports change notification or it does not; the
/// capability is attached at construction, never probed at runtime.
pub trait VehicleUpdateListener: Send + Sync {
    fn vehicles_updated(&self, vehicles: &[Vehicle]);
}

/// Live vehicle state.
#[async_trait::async_trait]
pub trait VehicleStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Vehicle>>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Vehicle>>;

    /// Case-insensitive exact match on the license plate.
    async fn find_by_plate(&self, plate: &str) -> StoreResult<Option<Vehicle>>;

    async fn insert(&self, vehicle: Vehicle) -> StoreResult<Vehicle>;

    /// Replace the stored state for the vehicle with the same id.
    async fn update(&self, vehicle: Vehicle) -> StoreResult<Vehicle>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Geofence definitions.
#[async_trait::async_trait]
pub trait GeofenceStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Geofence>>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Geofence>>;

    /// Active geofences assigned to the vehicle.
    async fn list_for_vehicle(&self, vehicle_id: Uuid) -> StoreResult<Vec<Geofence>>;

    async fn insert(&self, geofence: Geofence) -> StoreResult<Geofence>;

    async fn update(&self, geofence: Geofence) -> StoreResult<Geofence>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Record that the geofence fired at `at`.
    async fn touch_last_triggered(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()>;
}

/// Alert sink and operator-facing alert management.
#[async_trait::async_trait]
pub trait AlertStore: Send + Sync {
    async fn insert(&self, alert: Alert) -> StoreResult<Alert>;

    /// All alerts, newest first.
    async fn list(&self) -> StoreResult<Vec<Alert>>;

    async fn mark_all_read(&self) -> StoreResult<()>;

    async fn clear_read(&self) -> StoreResult<()>;
}

/// Append-only position history.
#[async_trait::async_trait]
pub trait TrackStore: Send + Sync {
    /// Append one record; the log is never mutated afterwards.
    async fn append(&self, point: TrackPoint) -> StoreResult<Uuid>;

    /// Records for one vehicle within `[start, end]`, ascending by time.
    async fn points_in_range(
        &self,
        vehicle_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<TrackPoint>>;
}

/// Finalized trips.
#[async_trait::async_trait]
pub trait TripStore: Send + Sync {
    /// Persist a replay result as a unit: either every trip or none.
    async fn insert_all(&self, trips: Vec<Trip>) -> StoreResult<()>;

    /// Trips for one vehicle overlapping `[start, end]`.
    async fn list_in_range(
        &self,
        vehicle_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Trip>>;
}
