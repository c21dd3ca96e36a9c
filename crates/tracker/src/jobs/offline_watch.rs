//! Staleness sweep marking silent vehicles offline.
//!
//! Offline status is never derived from a fix; this periodic job assigns
//! it from elapsed time since the last update, and raises a system alert
//! when a vehicle goes dark.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use domain::models::{Alert, AlertPriority, AlertType, VehicleStatus};
use persistence::store::{AlertStore, VehicleStore};

use crate::config::LivenessConfig;

struct SweepState {
    vehicles: Arc<dyn VehicleStore>,
    alerts: Arc<dyn AlertStore>,
    offline_after: Duration,
}

impl SweepState {
    async fn sweep_at(&self, now: DateTime<Utc>) -> anyhow::Result<usize> {
        let mut marked = 0;
        for mut vehicle in self.vehicles.list().await? {
            if vehicle.status == VehicleStatus::Offline
                || !vehicle.is_stale(now, self.offline_after)
            {
                continue;
            }

            vehicle.status = VehicleStatus::Offline;
            let vehicle = self.vehicles.update(vehicle).await?;

            let minutes = self.offline_after.num_minutes();
            let alert = Alert::new(
                AlertType::System,
                AlertPriority::Info,
                vehicle.id,
                vehicle.name.clone(),
                format!("Vehicle offline for more than {minutes} minutes"),
                now,
            );
            self.alerts.insert(alert).await?;

            info!(vehicle_id = %vehicle.id, plate = %vehicle.license_plate, "vehicle marked offline");
            marked += 1;
        }
        Ok(marked)
    }
}

pub struct OfflineWatch {
    state: Arc<SweepState>,
    sweep_interval: std::time::Duration,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl OfflineWatch {
    pub fn new(
        vehicles: Arc<dyn VehicleStore>,
        alerts: Arc<dyn AlertStore>,
        config: &LivenessConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            state: Arc::new(SweepState {
                vehicles,
                alerts,
                offline_after: Duration::minutes(config.offline_after_minutes),
            }),
            sweep_interval: std::time::Duration::from_secs(config.sweep_interval_seconds),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Run one sweep at `now`; returns how many vehicles went offline.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> anyhow::Result<usize> {
        self.state.sweep_at(now).await
    }

    /// Spawn the periodic sweep. The first tick is skipped so startup does
    /// not immediately flag vehicles restored from a snapshot.
    pub fn start(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let sweep_interval = self.sweep_interval;
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            interval.tick().await;

            info!(interval = ?sweep_interval, "offline watch scheduled");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match state.sweep_at(Utc::now()).await {
                            Ok(marked) if marked > 0 => {
                                info!(marked, "offline sweep completed");
                            }
                            Ok(_) => {}
                            Err(e) => error!(error = %e, "offline sweep failed"),
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("offline watch shutting down");
                            break;
                        }
                    }
                }
            }
        })
    }

    /// Signal the sweep loop to stop; returns immediately.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
