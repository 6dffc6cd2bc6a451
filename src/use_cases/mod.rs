// Use cases layer: driving simulations and managing their lifecycle.

pub mod registry;
pub mod simulation;
pub mod types;

pub use registry::{RegistryError, SimulationHandle, SimulationRegistry, SimulationSettings};
pub use types::{CommandError, SimCommand, SimStatus, SimUpdate};
