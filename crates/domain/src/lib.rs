//! Domain layer for the Fleet Tracker backend.
//!
//! This crate contains:
//! - Domain models (Vehicle, LocationPoint, Trip, Geofence, Alert)
//! - Business logic services (trip segmentation, geofence evaluation,
//!   speed monitoring)
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;
