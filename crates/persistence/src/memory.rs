//! In-memory store.
//!
//! Explicit state maps behind async locks; no hidden timers or background
//! mutation. Used as the default backend and in tests. The optional vehicle
//! update listener is attached at construction.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use domain::models::{Alert, Geofence, TrackPoint, Trip, Vehicle};

use crate::metrics::StoreTimer;
use crate::store::{
    AlertStore, GeofenceStore, StoreError, StoreResult, TrackStore, TripStore, VehicleStore,
    VehicleUpdateListener,
};

/// In-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    vehicles: RwLock<HashMap<Uuid, Vehicle>>,
    geofences: RwLock<HashMap<Uuid, Geofence>>,
    alerts: RwLock<HashMap<Uuid, Alert>>,
    tracks: RwLock<HashMap<Uuid, Vec<TrackPoint>>>,
    trips: RwLock<Vec<Trip>>,
    listener: Option<Arc<dyn VehicleUpdateListener>>,
}

impl MemoryStore {
    /// A store without change notification.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that notifies `listener` after every vehicle mutation.
    pub fn with_listener(listener: Arc<dyn VehicleUpdateListener>) -> Self {
        Self {
            listener: Some(listener),
            ..Self::default()
        }
    }

    async fn notify_vehicle_update(&self) {
        if let Some(listener) = &self.listener {
            let vehicles: Vec<Vehicle> = self.vehicles.read().await.values().cloned().collect();
            listener.vehicles_updated(&vehicles);
        }
    }
}

#[async_trait::async_trait]
impl VehicleStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Vehicle>> {
        let timer = StoreTimer::new("list_vehicles");
        let vehicles = self.vehicles.read().await.values().cloned().collect();
        timer.record();
        Ok(vehicles)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        let timer = StoreTimer::new("get_vehicle");
        let vehicle = self.vehicles.read().await.get(&id).cloned();
        timer.record();
        Ok(vehicle)
    }

    async fn find_by_plate(&self, plate: &str) -> StoreResult<Option<Vehicle>> {
        let timer = StoreTimer::new("find_vehicle_by_plate");
        let vehicle = self
            .vehicles
            .read()
            .await
            .values()
            .find(|v| v.matches_plate(plate))
            .cloned();
        timer.record();
        Ok(vehicle)
    }

    async fn insert(&self, vehicle: Vehicle) -> StoreResult<Vehicle> {
        let timer = StoreTimer::new("insert_vehicle");
        self.vehicles
            .write()
            .await
            .insert(vehicle.id, vehicle.clone());
        timer.record();
        self.notify_vehicle_update().await;
        Ok(vehicle)
    }

    async fn update(&self, vehicle: Vehicle) -> StoreResult<Vehicle> {
        let timer = StoreTimer::new("update_vehicle");
        {
            let mut vehicles = self.vehicles.write().await;
            if !vehicles.contains_key(&vehicle.id) {
                timer.record();
                return Err(StoreError::NotFound(format!("vehicle {}", vehicle.id)));
            }
            vehicles.insert(vehicle.id, vehicle.clone());
        }
        timer.record();
        self.notify_vehicle_update().await;
        Ok(vehicle)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let timer = StoreTimer::new("delete_vehicle");
        let removed = self.vehicles.write().await.remove(&id).is_some();
        timer.record();
        if removed {
            self.notify_vehicle_update().await;
        }
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl GeofenceStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Geofence>> {
        let timer = StoreTimer::new("list_geofences");
        let geofences = self.geofences.read().await.values().cloned().collect();
        timer.record();
        Ok(geofences)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Geofence>> {
        let timer = StoreTimer::new("get_geofence");
        let geofence = self.geofences.read().await.get(&id).cloned();
        timer.record();
        Ok(geofence)
    }

    async fn list_for_vehicle(&self, vehicle_id: Uuid) -> StoreResult<Vec<Geofence>> {
        let timer = StoreTimer::new("list_geofences_for_vehicle");
        let geofences = self
            .geofences
            .read()
            .await
            .values()
            .filter(|g| g.applies_to(vehicle_id))
            .cloned()
            .collect();
        timer.record();
        Ok(geofences)
    }

    async fn insert(&self, geofence: Geofence) -> StoreResult<Geofence> {
        let timer = StoreTimer::new("insert_geofence");
        geofence
            .validate_zone()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        self.geofences
            .write()
            .await
            .insert(geofence.id, geofence.clone());
        timer.record();
        Ok(geofence)
    }

    async fn update(&self, geofence: Geofence) -> StoreResult<Geofence> {
        let timer = StoreTimer::new("update_geofence");
        geofence
            .validate_zone()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut geofences = self.geofences.write().await;
        if !geofences.contains_key(&geofence.id) {
            timer.record();
            return Err(StoreError::NotFound(format!("geofence {}", geofence.id)));
        }
        geofences.insert(geofence.id, geofence.clone());
        timer.record();
        Ok(geofence)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let timer = StoreTimer::new("delete_geofence");
        let removed = self.geofences.write().await.remove(&id).is_some();
        timer.record();
        Ok(removed)
    }

    async fn touch_last_triggered(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        let timer = StoreTimer::new("touch_geofence_last_triggered");
        let mut geofences = self.geofences.write().await;
        let geofence = geofences
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("geofence {id}")))?;
        geofence.last_triggered = Some(at);
        timer.record();
        Ok(())
    }
}

#[async_trait::async_trait]
impl AlertStore for MemoryStore {
    async fn insert(&self, alert: Alert) -> StoreResult<Alert> {
        let timer = StoreTimer::new("insert_alert");
        self.alerts.write().await.insert(alert.id, alert.clone());
        timer.record();
        tracing::debug!(
            alert_id = %alert.id,
            alert_type = %alert.alert_type,
            priority = %alert.priority,
            "alert stored"
        );
        Ok(alert)
    }

    async fn list(&self) -> StoreResult<Vec<Alert>> {
        let timer = StoreTimer::new("list_alerts");
        let mut alerts: Vec<Alert> = self.alerts.read().await.values().cloned().collect();
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        timer.record();
        Ok(alerts)
    }

    async fn mark_all_read(&self) -> StoreResult<()> {
        let timer = StoreTimer::new("mark_all_alerts_read");
        for alert in self.alerts.write().await.values_mut() {
            alert.read = true;
        }
        timer.record();
        Ok(())
    }

    async fn clear_read(&self) -> StoreResult<()> {
        let timer = StoreTimer::new("clear_read_alerts");
        self.alerts.write().await.retain(|_, alert| !alert.read);
        timer.record();
        Ok(())
    }
}

#[async_trait::async_trait]
impl TrackStore for MemoryStore {
    async fn append(&self, point: TrackPoint) -> StoreResult<Uuid> {
        let timer = StoreTimer::new("append_track_point");
        let id = point.id;
        self.tracks
            .write()
            .await
            .entry(point.vehicle_id)
            .or_default()
            .push(point);
        timer.record();
        Ok(id)
    }

    async fn points_in_range(
        &self,
        vehicle_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<TrackPoint>> {
        let timer = StoreTimer::new("track_points_in_range");
        let mut points: Vec<TrackPoint> = self
            .tracks
            .read()
            .await
            .get(&vehicle_id)
            .map(|log| {
                log.iter()
                    .filter(|p| p.recorded_at >= start && p.recorded_at <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // callers rely on ascending order; the copy is sorted, the log is not touched
        points.sort_by_key(|p| p.recorded_at);
        timer.record();
        Ok(points)
    }
}

#[async_trait::async_trait]
impl TripStore for MemoryStore {
    async fn insert_all(&self, trips: Vec<Trip>) -> StoreResult<()> {
        let timer = StoreTimer::new("insert_trips");
        self.trips.write().await.extend(trips);
        timer.record();
        Ok(())
    }

    async fn list_in_range(
        &self,
        vehicle_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Trip>> {
        let timer = StoreTimer::new("trips_in_range");
        let trips = self
            .trips
            .read()
            .await
            .iter()
            .filter(|t| t.vehicle_id == vehicle_id && t.overlaps(start, end))
            .cloned()
            .collect();
        timer.record();
        Ok(trips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use domain::models::{
        Alert, AlertPriority, AlertType, Coordinates, GeofenceZone, IgnitionState, TrackingFix,
        VehicleStatus,
    };
    use fake::faker::number::en::NumberWithFormat;
    use fake::Fake;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
    }

    fn random_plate() -> String {
        NumberWithFormat("ABC-####").fake()
    }

    fn vehicle(plate: &str) -> Vehicle {
        let fix = TrackingFix {
            license_plate: plate.to_string(),
            latitude: -23.5505,
            longitude: -46.6333,
            current_speed: 40.0,
            heading: None,
            accuracy: None,
            battery_level: None,
            timestamp: None,
        };
        Vehicle::from_first_fix(&fix, at())
    }

    fn track_point(vehicle_id: Uuid, minutes_offset: i64) -> TrackPoint {
        TrackPoint {
            id: Uuid::new_v4(),
            vehicle_id,
            license_plate: "ABC-1234".to_string(),
            latitude: -23.5505,
            longitude: -46.6333,
            speed: 40.0,
            heading: 0.0,
            accuracy: 5.0,
            status: VehicleStatus::Moving,
            ignition: IgnitionState::On,
            recorded_at: at() + Duration::minutes(minutes_offset),
        }
    }

    fn circle_fence(vehicle_ids: Vec<Uuid>) -> Geofence {
        Geofence {
            id: Uuid::new_v4(),
            name: "Central Depot".to_string(),
            description: None,
            zone: GeofenceZone::Circle {
                center: Coordinates::new(-23.5505, -46.6333),
                radius: 500.0,
            },
            active: true,
            rules: vec![],
            vehicle_ids,
            last_triggered: None,
            color: None,
        }
    }

    #[tokio::test]
    async fn test_vehicle_crud() {
        let store = MemoryStore::new();
        let v = vehicle(&random_plate());

        let inserted = VehicleStore::insert(&store, v.clone()).await.unwrap();
        assert_eq!(inserted.id, v.id);
        assert_eq!(VehicleStore::list(&store).await.unwrap().len(), 1);

        let mut updated = v.clone();
        updated.name = "Truck 01".to_string();
        let updated = VehicleStore::update(&store, updated).await.unwrap();
        assert_eq!(updated.name, "Truck 01");
        assert_eq!(
            VehicleStore::get(&store, v.id).await.unwrap().unwrap().name,
            "Truck 01"
        );

        assert!(VehicleStore::delete(&store, v.id).await.unwrap());
        assert!(!VehicleStore::delete(&store, v.id).await.unwrap());
        assert!(VehicleStore::get(&store, v.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_vehicle_is_not_found() {
        let store = MemoryStore::new();
        let result = VehicleStore::update(&store, vehicle("ABC-1234")).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_plate_is_case_insensitive() {
        let store = MemoryStore::new();
        let v = vehicle("ABC-1234");
        VehicleStore::insert(&store, v.clone()).await.unwrap();

        let found = store.find_by_plate("abc-1234").await.unwrap().unwrap();
        assert_eq!(found.id, v.id);
        assert!(store.find_by_plate("ZZZ-0000").await.unwrap().is_none());
    }

    struct CountingListener {
        calls: AtomicUsize,
        last_len: AtomicUsize,
    }

    impl VehicleUpdateListener for CountingListener {
        fn vehicles_updated(&self, vehicles: &[Vehicle]) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_len.store(vehicles.len(), Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_listener_fires_on_vehicle_mutations() {
        let listener = Arc::new(CountingListener {
            calls: AtomicUsize::new(0),
            last_len: AtomicUsize::new(0),
        });
        let store = MemoryStore::with_listener(listener.clone());

        let v = vehicle(&random_plate());
        VehicleStore::insert(&store, v.clone()).await.unwrap();
        let mut v2 = v.clone();
        v2.current_speed = 0.0;
        VehicleStore::update(&store, v2).await.unwrap();
        VehicleStore::delete(&store, v.id).await.unwrap();

        assert_eq!(listener.calls.load(Ordering::SeqCst), 3);
        assert_eq!(listener.last_len.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_listener_not_fired_on_reads_or_failed_delete() {
        let listener = Arc::new(CountingListener {
            calls: AtomicUsize::new(0),
            last_len: AtomicUsize::new(0),
        });
        let store = MemoryStore::with_listener(listener.clone());

        VehicleStore::list(&store).await.unwrap();
        store.find_by_plate("ABC-1234").await.unwrap();
        VehicleStore::delete(&store, Uuid::new_v4()).await.unwrap();
        assert_eq!(listener.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_geofence_queries_by_vehicle() {
        let store = MemoryStore::new();
        let assigned = Uuid::new_v4();
        let other = Uuid::new_v4();

        GeofenceStore::insert(&store, circle_fence(vec![assigned]))
            .await
            .unwrap();
        let mut inactive = circle_fence(vec![assigned]);
        inactive.active = false;
        GeofenceStore::insert(&store, inactive).await.unwrap();

        assert_eq!(store.list_for_vehicle(assigned).await.unwrap().len(), 1);
        assert!(store.list_for_vehicle(other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_geofence_insert_rejects_bad_zone() {
        let store = MemoryStore::new();
        let mut fence = circle_fence(vec![]);
        fence.zone = GeofenceZone::Circle {
            center: Coordinates::new(-23.5505, -46.6333),
            radius: -10.0,
        };
        let result = GeofenceStore::insert(&store, fence).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn test_geofence_touch_last_triggered() {
        let store = MemoryStore::new();
        let fence = GeofenceStore::insert(&store, circle_fence(vec![]))
            .await
            .unwrap();
        assert!(fence.last_triggered.is_none());

        store.touch_last_triggered(fence.id, at()).await.unwrap();
        let stored = GeofenceStore::get(&store, fence.id).await.unwrap().unwrap();
        assert_eq!(stored.last_triggered, Some(at()));

        let missing = store.touch_last_triggered(Uuid::new_v4(), at()).await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_alert_lifecycle() {
        let store = MemoryStore::new();
        let vehicle_id = Uuid::new_v4();
        for (i, priority) in [AlertPriority::Info, AlertPriority::Critical]
            .into_iter()
            .enumerate()
        {
            let alert = Alert::new(
                AlertType::System,
                priority,
                vehicle_id,
                "Truck 01",
                format!("alert {i}"),
                at() + Duration::minutes(i as i64),
            );
            AlertStore::insert(&store, alert).await.unwrap();
        }

        // newest first
        let alerts = AlertStore::list(&store).await.unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts[0].timestamp > alerts[1].timestamp);

        store.mark_all_read().await.unwrap();
        assert!(AlertStore::list(&store).await.unwrap().iter().all(|a| a.read));

        store.clear_read().await.unwrap();
        assert!(AlertStore::list(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_track_log_range_query() {
        let store = MemoryStore::new();
        let vehicle_id = Uuid::new_v4();

        for offset in [0, 10, 20, 30] {
            store.append(track_point(vehicle_id, offset)).await.unwrap();
        }
        store.append(track_point(Uuid::new_v4(), 5)).await.unwrap();

        let points = store
            .points_in_range(vehicle_id, at(), at() + Duration::minutes(20))
            .await
            .unwrap();
        assert_eq!(points.len(), 3);
        for pair in points.windows(2) {
            assert!(pair[0].recorded_at <= pair[1].recorded_at);
        }

        let none = store
            .points_in_range(Uuid::new_v4(), at(), at() + Duration::hours(1))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_trip_store_round_trip() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let vehicle_id = Uuid::new_v4();
            let trip = Trip {
                id: Uuid::new_v4(),
                vehicle_id,
                start_time: at(),
                end_time: at() + Duration::minutes(30),
                total_distance_meters: 1000.0,
                travel_time_minutes: 30.0,
                stopped_time_minutes: 0.0,
                average_speed_kmh: 2.0,
                max_speed_kmh: 10.0,
                stops_count: 0,
                points: vec![],
                events: vec![],
            };
            store.insert_all(vec![trip.clone()]).await.unwrap();

            let found = store
                .list_in_range(vehicle_id, at(), at() + Duration::hours(1))
                .await
                .unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].id, trip.id);

            let outside = store
                .list_in_range(
                    vehicle_id,
                    at() + Duration::hours(2),
                    at() + Duration::hours(3),
                )
                .await
                .unwrap();
            assert!(outside.is_empty());
        });
    }
}
