//! Trip segmentation over per-vehicle position streams.
//!
//! A single time-ordered pass partitions a vehicle's samples into trips at
//! idle gaps, accumulating distance, max speed and stop intervals as it
//! goes, then finalizes each trip's statistics.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{LocationPoint, RouteEvent, RouteEventType, Trip};
use shared::geo::haversine_distance;

/// Tunable thresholds for trip segmentation.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentationConfig {
    /// Speed at or below which a sample counts as stopped, km/h.
    #[serde(default = "default_stop_speed_threshold")]
    pub stop_speed_threshold_kmh: f64,

    /// Minimum duration before a stop interval is surfaced as a stop event.
    #[serde(default = "default_min_stop_duration")]
    pub min_stop_duration_minutes: i64,

    /// A gap between consecutive samples longer than this closes the
    /// current trip and opens a new one.
    #[serde(default = "default_trip_gap")]
    pub trip_gap_minutes: i64,
}

fn default_stop_speed_threshold() -> f64 {
    5.0
}
fn default_min_stop_duration() -> i64 {
    5
}
fn default_trip_gap() -> i64 {
    30
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            stop_speed_threshold_kmh: default_stop_speed_threshold(),
            min_stop_duration_minutes: default_min_stop_duration(),
            trip_gap_minutes: default_trip_gap(),
        }
    }
}

impl SegmentationConfig {
    pub fn min_stop_duration(&self) -> Duration {
        Duration::minutes(self.min_stop_duration_minutes)
    }

    pub fn trip_gap(&self) -> Duration {
        Duration::minutes(self.trip_gap_minutes)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.stop_speed_threshold_kmh.is_finite() || self.stop_speed_threshold_kmh < 0.0 {
            return Err(DomainError::Validation(
                "stop speed threshold must be non-negative".into(),
            ));
        }
        if self.min_stop_duration_minutes <= 0 {
            return Err(DomainError::Validation(
                "minimum stop duration must be positive".into(),
            ));
        }
        if self.trip_gap_minutes <= 0 {
            return Err(DomainError::Validation(
                "trip gap threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn minutes(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 60_000.0
}

/// Accumulator for the trip currently being built.
#[derive(Debug)]
struct TripAccumulator {
    vehicle_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    points: Vec<LocationPoint>,
    events: Vec<RouteEvent>,
    total_distance_meters: f64,
    max_speed_kmh: f64,
    stopped_minutes: f64,
    open_stop: Option<DateTime<Utc>>,
}

impl TripAccumulator {
    /// Open a trip at its first point: departure event, accumulator reset,
    /// and stop tracking if the vehicle is already below the threshold.
    fn open(vehicle_id: Uuid, point: &LocationPoint, config: &SegmentationConfig) -> Self {
        Self {
            vehicle_id,
            start_time: point.timestamp,
            end_time: point.timestamp,
            points: vec![point.clone()],
            events: vec![RouteEvent::departure(
                point.latitude,
                point.longitude,
                point.timestamp,
            )],
            total_distance_meters: 0.0,
            max_speed_kmh: point.speed,
            stopped_minutes: 0.0,
            open_stop: (point.speed <= config.stop_speed_threshold_kmh).then_some(point.timestamp),
        }
    }

    fn last_point(&self) -> &LocationPoint {
        &self.points[self.points.len() - 1]
    }

    /// Fold the next point into the trip.
    fn extend(&mut self, point: &LocationPoint, config: &SegmentationConfig) {
        let previous = self.last_point();
        let (prev_lat, prev_lon) = (previous.latitude, previous.longitude);
        self.total_distance_meters +=
            haversine_distance(prev_lat, prev_lon, point.latitude, point.longitude);

        self.points.push(point.clone());
        self.end_time = point.timestamp;

        if point.speed > self.max_speed_kmh {
            self.max_speed_kmh = point.speed;
        }

        if point.speed <= config.stop_speed_threshold_kmh {
            if self.open_stop.is_none() {
                self.open_stop = Some(point.timestamp);
            }
        } else if let Some(started) = self.open_stop.take() {
            self.record_stop(started, point.timestamp, point.latitude, point.longitude, config);
        }
    }

    /// Close an open stop against `end_time`; used when the stream ends
    /// while the vehicle is still below the threshold.
    fn close_open_stop(&mut self, config: &SegmentationConfig) {
        if let Some(started) = self.open_stop.take() {
            let last = self.last_point();
            let (lat, lon, until) = (last.latitude, last.longitude, self.end_time);
            self.record_stop(started, until, lat, lon, config);
        }
    }

    /// A stop shorter than the minimum duration is not surfaced.
    fn record_stop(
        &mut self,
        started: DateTime<Utc>,
        until: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        config: &SegmentationConfig,
    ) {
        let duration = until - started;
        if duration >= config.min_stop_duration() {
            let duration_minutes = minutes(duration);
            self.events
                .push(RouteEvent::stop(latitude, longitude, started, duration_minutes));
            self.stopped_minutes += duration_minutes;
        }
    }

    /// Finalize: arrival event, derived statistics, ordered event list.
    fn finish(mut self) -> Trip {
        let last = self.last_point();
        let (lat, lon) = (last.latitude, last.longitude);
        self.events.push(RouteEvent::arrival(lat, lon, self.end_time));

        let travel_time_minutes = minutes(self.end_time - self.start_time);
        let stops_count = self
            .events
            .iter()
            .filter(|e| e.event_type == RouteEventType::Stop)
            .count();
        let movement_minutes = travel_time_minutes - self.stopped_minutes;
        let average_speed_kmh = if movement_minutes > 0.0 {
            (self.total_distance_meters / 1000.0) / (movement_minutes / 60.0)
        } else {
            0.0
        };

        // Stops are appended at close time but stamped at their start, so
        // the list is re-ordered before it is considered final.
        self.events.sort_by_key(|e| e.timestamp);

        Trip {
            id: Uuid::new_v4(),
            vehicle_id: self.vehicle_id,
            start_time: self.start_time,
            end_time: self.end_time,
            total_distance_meters: self.total_distance_meters,
            travel_time_minutes,
            stopped_time_minutes: self.stopped_minutes,
            average_speed_kmh,
            max_speed_kmh: self.max_speed_kmh,
            stops_count,
            points: self.points,
            events: self.events,
        }
    }
}

/// Splits a time-ordered point stream into trips.
#[derive(Debug, Clone, Default)]
pub struct TripSegmenter {
    config: SegmentationConfig,
}

impl TripSegmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Partition `points` into trips.
    ///
    /// Every input point lands in exactly one trip, in order. The stream
    /// must be non-empty, finite-valued and non-decreasing in timestamp;
    /// out-of-order input is rejected rather than repaired.
    pub fn segment(
        &self,
        vehicle_id: Uuid,
        points: &[LocationPoint],
    ) -> Result<Vec<Trip>, DomainError> {
        if points.is_empty() {
            return Err(DomainError::Validation(
                "cannot segment an empty point stream".into(),
            ));
        }
        for point in points {
            if !point.latitude.is_finite() || !point.longitude.is_finite() {
                return Err(DomainError::Validation(format!(
                    "non-finite coordinates at {}",
                    point.timestamp
                )));
            }
            if !point.speed.is_finite() || point.speed < 0.0 {
                return Err(DomainError::Validation(format!(
                    "negative or non-finite speed at {}",
                    point.timestamp
                )));
            }
        }
        for pair in points.windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(DomainError::Sequence {
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }

        let mut trips = Vec::new();
        let mut current = TripAccumulator::open(vehicle_id, &points[0], &self.config);

        for point in &points[1..] {
            let gap = point.timestamp - current.last_point().timestamp;
            if gap > self.config.trip_gap() {
                trips.push(current.finish());
                current = TripAccumulator::open(vehicle_id, point, &self.config);
            } else {
                current.extend(point, &self.config);
            }
        }

        current.close_open_stop(&self.config);
        trips.push(current.finish());

        tracing::debug!(
            vehicle_id = %vehicle_id,
            points = points.len(),
            trips = trips.len(),
            "segmented position stream"
        );
        Ok(trips)
    }
}
