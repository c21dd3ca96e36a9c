//! Batch trip replay over stored position history.
//!
//! Replay is read-only over the track log and finalize-or-discard on the
//! trip store: a cancelled or failed replay persists nothing.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use domain::error::DomainError;
use domain::models::{LocationPoint, TrackPoint, Trip};
use domain::services::{SegmentationConfig, TripSegmenter};
use persistence::store::{TrackStore, TripStore};

use crate::error::TrackerError;

/// Rebuilds trips for a vehicle over a history range.
pub struct TripReplayService {
    tracks: Arc<dyn TrackStore>,
    trips: Arc<dyn TripStore>,
    segmenter: TripSegmenter,
}

impl TripReplayService {
    pub fn new(
        tracks: Arc<dyn TrackStore>,
        trips: Arc<dyn TripStore>,
        config: SegmentationConfig,
    ) -> Self {
        Self {
            tracks,
            trips,
            segmenter: TripSegmenter::new(config),
        }
    }

    /// Pure segmentation over an already-fetched point list.
    pub fn segment(
        &self,
        vehicle_id: Uuid,
        points: &[LocationPoint],
    ) -> Result<Vec<Trip>, DomainError> {
        self.segmenter.segment(vehicle_id, points)
    }

    /// Fetch the vehicle's history for `[start, end]`, segment it and
    /// persist the result as a unit.
    ///
    /// An empty range is a no-op, not an error. Cancellation is honored
    /// between stages; once persistence has begun the result is complete.
    pub async fn replay(
        &self,
        vehicle_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Trip>, TrackerError> {
        if cancel.is_cancelled() {
            return Err(TrackerError::Cancelled);
        }

        let records = self.tracks.points_in_range(vehicle_id, start, end).await?;
        if records.is_empty() {
            tracing::debug!(vehicle_id = %vehicle_id, "no history in range, nothing to replay");
            return Ok(Vec::new());
        }

        if cancel.is_cancelled() {
            return Err(TrackerError::Cancelled);
        }

        let points: Vec<LocationPoint> =
            records.iter().map(TrackPoint::to_location_point).collect();
        let trips = self.segmenter.segment(vehicle_id, &points)?;

        // last chance to abandon the batch before anything is written
        if cancel.is_cancelled() {
            return Err(TrackerError::Cancelled);
        }

        self.trips.insert_all(trips.clone()).await?;
        tracing::info!(
            vehicle_id = %vehicle_id,
            points = points.len(),
            trips = trips.len(),
            "replay persisted"
        );
        Ok(trips)
    }
}
