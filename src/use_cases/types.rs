// Use-case level inputs/outputs for the simulation loop.

use crate::domain::{LesionSnapshot, ParamName, Stage, StageChange};
use thiserror::Error;

/// Requests applied by the simulation task between ticks, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    SetParams(Vec<(ParamName, i64)>),
    SetStage(Stage),
    AdvanceStage,
    Reset,
    SetAccelerator(f64),
    Pause,
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    Running,
    Paused,
    Stopped,
}

/// Published after every tick, and after commands applied while paused.
#[derive(Debug, Clone)]
pub struct SimUpdate {
    pub tick: u64,
    pub snapshot: LesionSnapshot,
    pub stage_change: Option<StageChange>,
}

#[derive(Debug, Error)]
pub enum CommandError {
    /// The simulation task has exited and no longer accepts commands.
    #[error("simulation {0} is not running")]
    Closed(String),
}
