//! Orchestration layer for the Fleet Tracker backend.
//!
//! Wires the domain services to the storage layer: configuration loading,
//! the fix ingest pipeline, batch trip replay and the background liveness
//! sweep.

pub mod config;
pub mod error;
pub mod ingest;
pub mod jobs;
pub mod replay;

pub use config::TrackerConfig;
pub use error::TrackerError;
pub use ingest::{IngestCoordinator, IngestOutcome};
pub use replay::TripReplayService;
