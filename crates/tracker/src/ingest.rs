//! Fix ingest pipeline.
//!
//! One raw GPS fix drives, in order: live vehicle state, the append-only
//! position history, geofence transition evaluation and the speed check.
//! Fixes for the same vehicle are serialized behind a per-plate lock;
//! different vehicles proceed in parallel.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use domain::error::DomainError;
use domain::models::{
    Alert, AlertPriority, AlertType, Coordinates, RouteEvent, SpeedViolation, TrackPoint,
    TrackingFix, Vehicle,
};
use domain::models::vehicle::normalize_plate;
use domain::services::{
    check_speed, evaluate_position, GeofenceTransition, SpeedPolicy, ZoneStates,
};
use domain::models::GeofenceRuleType;
use persistence::store::{AlertStore, GeofenceStore, TrackStore, VehicleStore};

use crate::error::TrackerError;

/// Everything one fix produced.
#[derive(Debug)]
pub struct IngestOutcome {
    pub vehicle: Vehicle,
    pub events: Vec<RouteEvent>,
    pub alerts: Vec<Alert>,
    pub violations: Vec<SpeedViolation>,
}

/// Orchestrates the per-fix pipeline against the injected stores.
pub struct IngestCoordinator {
    vehicles: Arc<dyn VehicleStore>,
    geofences: Arc<dyn GeofenceStore>,
    alerts: Arc<dyn AlertStore>,
    tracks: Arc<dyn TrackStore>,
    speed_policy: SpeedPolicy,
    zone_states: Mutex<HashMap<Uuid, ZoneStates>>,
    plate_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IngestCoordinator {
    pub fn new(
        vehicles: Arc<dyn VehicleStore>,
        geofences: Arc<dyn GeofenceStore>,
        alerts: Arc<dyn AlertStore>,
        tracks: Arc<dyn TrackStore>,
        speed_policy: SpeedPolicy,
    ) -> Self {
        Self {
            vehicles,
            geofences,
            alerts,
            tracks,
            speed_policy,
            zone_states: Mutex::new(HashMap::new()),
            plate_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for_plate(&self, plate: &str) -> Arc<Mutex<()>> {
        let mut locks = self.plate_locks.lock().await;
        locks
            .entry(plate.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Ingest one raw fix.
    ///
    /// Creates the vehicle on the first fix for an unknown plate, updates
    /// it in place otherwise. A missing timestamp means "now". The speed
    /// check never gates the position update.
    pub async fn ingest_fix(&self, fix: TrackingFix) -> Result<IngestOutcome, TrackerError> {
        fix.validate().map_err(DomainError::from)?;

        let plate = normalize_plate(&fix.license_plate);
        let lock = self.lock_for_plate(&plate).await;
        let _guard = lock.lock().await;

        let at = fix.timestamp.unwrap_or_else(Utc::now);

        let vehicle = match self.vehicles.find_by_plate(&plate).await? {
            Some(mut vehicle) => {
                vehicle.apply_fix(&fix, at);
                self.vehicles.update(vehicle).await?
            }
            None => {
                tracing::info!(plate = %plate, "first fix for unknown plate, creating vehicle");
                self.vehicles.insert(Vehicle::from_first_fix(&fix, at)).await?
            }
        };

        self.tracks
            .append(TrackPoint {
                id: Uuid::new_v4(),
                vehicle_id: vehicle.id,
                license_plate: plate.clone(),
                latitude: fix.latitude,
                longitude: fix.longitude,
                speed: fix.current_speed,
                heading: vehicle.heading,
                accuracy: vehicle.accuracy,
                status: vehicle.status,
                ignition: vehicle.ignition,
                recorded_at: at,
            })
            .await?;

        let mut events = Vec::new();
        let mut raised = Vec::new();
        let mut violations = Vec::new();

        let fences = self.geofences.list_for_vehicle(vehicle.id).await?;
        if !fences.is_empty() {
            let transitions = {
                let mut states = self.zone_states.lock().await;
                let vehicle_states = states.entry(vehicle.id).or_default();
                evaluate_position(
                    Coordinates::new(fix.latitude, fix.longitude),
                    at,
                    &fences,
                    vehicle_states,
                )
            };

            for transition in transitions {
                self.geofences
                    .touch_last_triggered(transition.geofence_id, transition.timestamp)
                    .await?;
                if let Some(event) = transition_event(&transition) {
                    events.push(event);
                }
                let alert = self.alerts.insert(transition_alert(&vehicle, &transition)).await?;
                raised.push(alert);
            }
        }

        if let Some(check) = check_speed(&vehicle, at, &self.speed_policy) {
            events.push(check.event);
            let alert = self.alerts.insert(check.alert).await?;
            raised.push(alert);
            violations.push(check.violation);
        }

        tracing::debug!(
            vehicle_id = %vehicle.id,
            plate = %plate,
            events = events.len(),
            alerts = raised.len(),
            "fix processed"
        );

        Ok(IngestOutcome {
            vehicle,
            events,
            alerts: raised,
            violations,
        })
    }

    /// Administrative vehicle removal; also drops its debounce state.
    pub async fn delete_vehicle(&self, id: Uuid) -> Result<bool, TrackerError> {
        let removed = self.vehicles.delete(id).await?;
        if removed {
            self.zone_states.lock().await.remove(&id);
        }
        Ok(removed)
    }
}

/// Entry/exit transitions land on the trip timeline; dwell and window
/// violations are alert-only.
fn transition_event(transition: &GeofenceTransition) -> Option<RouteEvent> {
    match transition.kind {
        GeofenceRuleType::Entry => Some(RouteEvent::geofence_entry(
            transition.latitude,
            transition.longitude,
            transition.timestamp,
            transition.geofence_name.clone(),
        )),
        GeofenceRuleType::Exit => Some(RouteEvent::geofence_exit(
            transition.latitude,
            transition.longitude,
            transition.timestamp,
            transition.geofence_name.clone(),
        )),
        GeofenceRuleType::Dwell | GeofenceRuleType::TimeViolation => None,
    }
}

fn transition_alert(vehicle: &Vehicle, transition: &GeofenceTransition) -> Alert {
    let name = &transition.geofence_name;
    let (alert_type, priority, message) = match transition.kind {
        GeofenceRuleType::Entry => (
            AlertType::GeofenceEntry,
            AlertPriority::Info,
            format!("Entered area '{name}'"),
        ),
        GeofenceRuleType::Exit => (
            AlertType::GeofenceExit,
            AlertPriority::Warning,
            format!("Left area '{name}'"),
        ),
        GeofenceRuleType::Dwell => (
            AlertType::GeofenceDwell,
            AlertPriority::Warning,
            format!("Dwelling in area '{name}' beyond the allowed time"),
        ),
        GeofenceRuleType::TimeViolation => (
            AlertType::System,
            AlertPriority::Warning,
            format!("Area '{name}' occupied outside allowed hours"),
        ),
    };

    let mut alert = Alert::new(
        alert_type,
        priority,
        vehicle.id,
        vehicle.name.clone(),
        message,
        transition.timestamp,
    )
    .at_position(transition.latitude, transition.longitude);
    alert.geofence_name = Some(transition.geofence_name.clone());
    alert
}
