//! Persistence layer for the Fleet Tracker backend.
//!
//! This crate contains:
//! - Store traits the core consumes (vehicles, geofences, alerts, track
//!   history, trips)
//! - The in-memory implementation used when no external database is
//!   configured
//! - Store operation metrics

pub mod memory;
pub mod metrics;
pub mod store;

pub use memory::MemoryStore;
pub use store::{
    AlertStore, GeofenceStore, StoreError, StoreResult, TrackStore, TripStore, VehicleStore,
    VehicleUpdateListener,
};
