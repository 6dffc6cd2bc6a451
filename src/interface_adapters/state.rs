use crate::use_cases::SimulationRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Owns every running simulation task.
    pub registry: Arc<SimulationRegistry>,
    // Pinned simulation that always exists.
    pub default_simulation_id: Arc<str>,
}
