// Domain layer: lesion simulation types and rules.

pub mod engine;
pub mod errors;
pub mod params;
pub mod stage;
pub mod state;
pub mod systems;
pub mod tuning;

pub use engine::LesionEngine;
pub use errors::EngineError;
pub use params::{ControlParameters, ParamName};
pub use stage::Stage;
pub use state::{BiologicalLevels, DerivedRates, LesionSnapshot, StageChange};
