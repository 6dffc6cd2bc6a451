// Registry orchestration for spawning and managing independent simulations.

use crate::domain::{ControlParameters, LesionEngine, LesionSnapshot};
use crate::use_cases::simulation::{TickSettings, simulation_task};
use crate::use_cases::{CommandError, SimCommand, SimStatus, SimUpdate};
use axum::extract::ws::Utf8Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Notify, RwLock, broadcast, mpsc, watch};
use tracing::info;

/// Shared configuration for spawning simulations.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// Capacity for queued commands per simulation.
    pub input_channel_capacity: usize,
    /// Capacity for broadcast per-tick updates.
    pub update_broadcast_capacity: usize,
    /// Wall-clock time between ticks.
    pub tick_interval: Duration,
    /// Simulated hours per tick.
    pub hours_per_tick: f64,
}

/// Errors returned by registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("simulation {0} already exists")]
    AlreadyExists(String),
    #[error("simulation {0} not found")]
    NotFound(String),
    #[error("simulation {0} is pinned and cannot be removed")]
    Pinned(String),
}

/// Per-simulation channels.
#[derive(Clone)]
pub struct SimulationHandle {
    /// Identifier clients use to target this simulation.
    pub simulation_id: Arc<str>,
    /// Sender for commands into the simulation task.
    pub input_tx: mpsc::Sender<SimCommand>,
    /// Broadcast sender for raw per-tick updates.
    pub update_tx: broadcast::Sender<SimUpdate>,
    /// Broadcast sender for serialized updates.
    pub update_bytes_tx: broadcast::Sender<Utf8Bytes>,
    /// Watch sender holding the latest serialized update.
    pub update_latest_tx: watch::Sender<Utf8Bytes>,
    /// Watch sender holding the latest snapshot.
    pub latest_tx: watch::Sender<LesionSnapshot>,
    /// Watch sender for run status changes.
    pub status_tx: watch::Sender<SimStatus>,
    /// Stops the simulation task.
    shutdown: Arc<Notify>,
    /// Pinned simulations are never removed.
    pinned: bool,
}

impl SimulationHandle {
    /// Queue a command for the next tick.
    pub async fn send(&self, command: SimCommand) -> Result<(), CommandError> {
        self.input_tx
            .send(command)
            .await
            .map_err(|_| CommandError::Closed(self.simulation_id.to_string()))
    }

    pub fn latest_snapshot(&self) -> LesionSnapshot {
        self.latest_tx.borrow().clone()
    }

    pub fn status(&self) -> SimStatus {
        *self.status_tx.borrow()
    }
}

/// Thread-safe registry for active simulations.
#[derive(Debug)]
pub struct SimulationRegistry {
    /// Global settings applied to newly created simulations.
    settings: SimulationSettings,
    /// Map of simulation id to active handle.
    simulations: RwLock<HashMap<String, SimulationHandle>>,
}

impl std::fmt::Debug for SimulationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationHandle")
            .field("simulation_id", &self.simulation_id)
            .field("pinned", &self.pinned)
            .finish_non_exhaustive()
    }
}

impl SimulationRegistry {
    pub fn new(settings: SimulationSettings) -> Self {
        Self {
            settings,
            simulations: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a new simulation and spawns its task.
    ///
    /// Also returns an update receiver subscribed before the task starts, so
    /// the caller sees every tick from the first one.
    pub async fn create_simulation(
        &self,
        simulation_id: String,
        params: ControlParameters,
        pinned: bool,
    ) -> Result<(SimulationHandle, broadcast::Receiver<SimUpdate>), RegistryError> {
        let mut simulations = self.simulations.write().await;
        if simulations.contains_key(&simulation_id) {
            return Err(RegistryError::AlreadyExists(simulation_id));
        }

        let engine = LesionEngine::new(params);

        // Channel wiring for the simulation loop.
        let (input_tx, input_rx) = mpsc::channel::<SimCommand>(self.settings.input_channel_capacity);
        let (update_tx, update_rx) = broadcast::channel::<SimUpdate>(self.settings.update_broadcast_capacity);
        let (update_bytes_tx, _update_bytes_rx) =
            broadcast::channel::<Utf8Bytes>(self.settings.update_broadcast_capacity);
        let (update_latest_tx, _update_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
        let (latest_tx, _latest_rx) = watch::channel::<LesionSnapshot>(engine.snapshot());
        let (status_tx, _status_rx) = watch::channel::<SimStatus>(SimStatus::Running);
        let shutdown = Arc::new(Notify::new());

        tokio::spawn(simulation_task(
            engine,
            input_rx,
            update_tx.clone(),
            latest_tx.clone(),
            status_tx.clone(),
            TickSettings {
                tick_interval: self.settings.tick_interval,
                hours_per_tick: self.settings.hours_per_tick,
            },
            shutdown.clone(),
        ));

        let handle = SimulationHandle {
            simulation_id: Arc::from(simulation_id.as_str()),
            input_tx,
            update_tx,
            update_bytes_tx,
            update_latest_tx,
            latest_tx,
            status_tx,
            shutdown,
            pinned,
        };

        info!(simulation_id = %simulation_id, pinned, "simulation created");
        simulations.insert(simulation_id, handle.clone());
        Ok((handle, update_rx))
    }

    /// Returns a handle for the provided id, if it exists.
    pub async fn get_simulation(&self, simulation_id: &str) -> Option<SimulationHandle> {
        let simulations = self.simulations.read().await;
        simulations.get(simulation_id).cloned()
    }

    /// Sorted ids of all active simulations.
    pub async fn simulation_ids(&self) -> Vec<String> {
        let simulations = self.simulations.read().await;
        let mut ids: Vec<String> = simulations.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Stops the simulation task and forgets the handle.
    pub async fn remove_simulation(&self, simulation_id: &str) -> Result<(), RegistryError> {
        let mut simulations = self.simulations.write().await;
        match simulations.get(simulation_id) {
            None => return Err(RegistryError::NotFound(simulation_id.to_string())),
            Some(handle) if handle.pinned => return Err(RegistryError::Pinned(simulation_id.to_string())),
            Some(_) => {}
        }

        if let Some(handle) = simulations.remove(simulation_id) {
            handle.shutdown.notify_one();
        }
        info!(simulation_id, "simulation removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry() -> SimulationRegistry {
        SimulationRegistry::new(SimulationSettings {
            input_channel_capacity: 16,
            update_broadcast_capacity: 64,
            tick_interval: Duration::from_millis(1),
            hours_per_tick: 1.0,
        })
    }

    #[tokio::test]
    async fn when_simulation_is_created_then_it_can_be_looked_up() {
        let registry = test_registry();

        let (handle, _) = registry
            .create_simulation("lesion-a".to_string(), ControlParameters::default(), false)
            .await
            .expect("expected simulation to be created");

        let found = registry
            .get_simulation("lesion-a")
            .await
            .expect("expected simulation to be registered");
        assert_eq!(found.simulation_id, handle.simulation_id);
        assert_eq!(registry.simulation_ids().await, vec!["lesion-a".to_string()]);
    }

    #[tokio::test]
    async fn when_id_is_taken_then_create_returns_already_exists() {
        let registry = test_registry();
        registry
            .create_simulation("dup".to_string(), ControlParameters::default(), false)
            .await
            .expect("first create");

        let result = registry
            .create_simulation("dup".to_string(), ControlParameters::default(), false)
            .await;

        assert!(matches!(result, Err(RegistryError::AlreadyExists(id)) if id == "dup"));
    }

    #[tokio::test]
    async fn when_initial_params_are_given_then_snapshot_carries_them() {
        let registry = test_registry();
        let params = ControlParameters {
            bacteria: 800,
            ..ControlParameters::default()
        };

        let (handle, _) = registry
            .create_simulation("custom".to_string(), params, false)
            .await
            .expect("create");

        assert_eq!(handle.latest_snapshot().params.bacteria, 800);
    }

    #[tokio::test]
    async fn when_simulation_is_removed_then_task_stops_and_lookup_fails() {
        let registry = test_registry();
        let (handle, _) = registry
            .create_simulation("gone".to_string(), ControlParameters::default(), false)
            .await
            .expect("create");
        let mut status_rx = handle.status_tx.subscribe();

        registry.remove_simulation("gone").await.expect("remove");

        tokio::time::timeout(Duration::from_secs(2), async {
            while *status_rx.borrow_and_update() != SimStatus::Stopped {
                status_rx.changed().await.expect("status channel open");
            }
        })
        .await
        .expect("simulation should stop");
        assert!(registry.get_simulation("gone").await.is_none());
    }

    #[tokio::test]
    async fn when_simulation_is_pinned_then_remove_is_rejected() {
        let registry = test_registry();
        registry
            .create_simulation("default".to_string(), ControlParameters::default(), true)
            .await
            .expect("create");

        let result = registry.remove_simulation("default").await;

        assert_eq!(result, Err(RegistryError::Pinned("default".to_string())));
        assert!(registry.get_simulation("default").await.is_some());
    }

    #[tokio::test]
    async fn when_simulation_is_created_then_returned_receiver_sees_the_first_tick() {
        let registry = test_registry();
        let (_handle, mut update_rx) = registry
            .create_simulation("first".to_string(), ControlParameters::default(), false)
            .await
            .expect("create");

        let update = tokio::time::timeout(Duration::from_secs(2), update_rx.recv())
            .await
            .expect("first update in time")
            .expect("update channel open");

        assert_eq!(update.tick, 1);
    }

    #[tokio::test]
    async fn when_removing_unknown_simulation_then_returns_not_found() {
        let registry = test_registry();

        let result = registry.remove_simulation("missing").await;

        assert_eq!(result, Err(RegistryError::NotFound("missing".to_string())));
    }
}
