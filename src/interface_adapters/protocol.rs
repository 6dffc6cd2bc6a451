// Wire protocol DTOs and conversions for the public simulation API.
// Domain types never derive serde; everything on the wire passes through here.

use crate::domain::{BiologicalLevels, ControlParameters, DerivedRates, LesionSnapshot, ParamName, StageChange};
use crate::use_cases::{SimStatus, SimUpdate};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    // State of the lesion after a tick.
    Snapshot(TickSnapshotDto),
    // The stage moved during the last tick or command batch.
    StageChanged(StageChangeDto),
    // Driver lifecycle (running, paused, stopped).
    Status(StatusDto),
}

/// Commands a client may send over the WebSocket instead of the HTTP routes.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    SetParams(ParamsPatchDto),
    SetStage(StageRequest),
    Advance,
    Reset,
    SetAccelerator(AcceleratorRequest),
    Pause,
    Resume,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelsDto {
    pub sebum: f64,
    pub bacteria: f64,
    pub inflammation: f64,
    pub neutrophils: f64,
    pub pus: f64,
    pub medication: f64,
    pub healing_progress: f64,
}

impl From<&BiologicalLevels> for LevelsDto {
    fn from(levels: &BiologicalLevels) -> Self {
        Self {
            sebum: levels.sebum,
            bacteria: levels.bacteria,
            inflammation: levels.inflammation,
            neutrophils: levels.neutrophils,
            pus: levels.pus,
            medication: levels.medication,
            healing_progress: levels.healing_progress,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RatesDto {
    pub sebum_rate: f64,
    pub bacteria_growth_rate: f64,
    pub baseline_inflammation: f64,
    pub humidity_effect: f64,
}

impl From<&DerivedRates> for RatesDto {
    fn from(rates: &DerivedRates) -> Self {
        Self {
            sebum_rate: rates.sebum_rate,
            bacteria_growth_rate: rates.bacteria_growth_rate,
            baseline_inflammation: rates.baseline_inflammation,
            humidity_effect: rates.humidity_effect,
        }
    }
}

/// Slider positions as stored, after clamping.
#[derive(Debug, Clone, Serialize)]
pub struct ParamsDto {
    pub sebum: u16,
    pub bacteria: u16,
    pub medication: u16,
    pub inflammation: u16,
    pub healing: u16,
    pub temperature: u16,
    pub humidity: u16,
    pub friction: u16,
}

impl From<&ControlParameters> for ParamsDto {
    fn from(params: &ControlParameters) -> Self {
        Self {
            sebum: params.sebum,
            bacteria: params.bacteria,
            medication: params.medication,
            inflammation: params.inflammation,
            healing: params.healing,
            temperature: params.temperature,
            humidity: params.humidity,
            friction: params.friction,
        }
    }
}

/// Partial parameter update. Omitted fields keep their current value; values
/// outside 0..=1000 are clamped by the engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamsPatchDto {
    #[serde(default)]
    pub sebum: Option<i64>,
    #[serde(default)]
    pub bacteria: Option<i64>,
    #[serde(default)]
    pub medication: Option<i64>,
    #[serde(default)]
    pub inflammation: Option<i64>,
    #[serde(default)]
    pub healing: Option<i64>,
    #[serde(default)]
    pub temperature: Option<i64>,
    #[serde(default)]
    pub humidity: Option<i64>,
    #[serde(default)]
    pub friction: Option<i64>,
}

impl ParamsPatchDto {
    /// Present fields as `(name, value)` pairs in canonical parameter order.
    pub fn into_updates(self) -> Vec<(ParamName, i64)> {
        let values = [
            self.sebum,
            self.bacteria,
            self.medication,
            self.inflammation,
            self.healing,
            self.temperature,
            self.humidity,
            self.friction,
        ];
        ParamName::ALL
            .into_iter()
            .zip(values)
            .filter_map(|(name, value)| value.map(|value| (name, value)))
            .collect()
    }

    /// Apply the patch on top of `base`, used for initial parameters.
    pub fn apply_to(self, mut base: ControlParameters) -> ControlParameters {
        for (name, value) in self.into_updates() {
            base.set(name, value);
        }
        base
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDto {
    pub stage: String,
    pub simulation_time: f64,
    pub progression_accelerator: f64,
    pub levels: LevelsDto,
    pub rates: RatesDto,
    pub params: ParamsDto,
}

impl From<&LesionSnapshot> for SnapshotDto {
    fn from(snapshot: &LesionSnapshot) -> Self {
        Self {
            stage: snapshot.stage.to_string(),
            simulation_time: snapshot.simulation_time,
            progression_accelerator: snapshot.progression_accelerator,
            levels: LevelsDto::from(&snapshot.levels),
            rates: RatesDto::from(&snapshot.rates),
            params: ParamsDto::from(&snapshot.params),
        }
    }
}

/// Snapshot tagged with the driver tick that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct TickSnapshotDto {
    pub tick: u64,
    #[serde(flatten)]
    pub snapshot: SnapshotDto,
}

impl From<&SimUpdate> for TickSnapshotDto {
    fn from(update: &SimUpdate) -> Self {
        Self {
            tick: update.tick,
            snapshot: SnapshotDto::from(&update.snapshot),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageChangeDto {
    pub tick: u64,
    pub from: String,
    pub to: String,
}

impl StageChangeDto {
    pub fn new(tick: u64, change: StageChange) -> Self {
        Self {
            tick,
            from: change.from.to_string(),
            to: change.to.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDto {
    pub status: &'static str,
}

impl From<SimStatus> for StatusDto {
    fn from(status: SimStatus) -> Self {
        let status = match status {
            SimStatus::Running => "running",
            SimStatus::Paused => "paused",
            SimStatus::Stopped => "stopped",
        };
        Self { status }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StageRequest {
    pub stage: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcceleratorRequest {
    pub value: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSimulationRequest {
    // Optional simulation id; when omitted the server generates one.
    #[serde(default)]
    pub simulation_id: Option<String>,
    // Initial slider positions layered over the defaults.
    #[serde(default)]
    pub params: Option<ParamsPatchDto>,
}

#[derive(Debug, Serialize)]
pub struct CreateSimulationResponse {
    pub simulation_id: String,
}

#[derive(Debug, Serialize)]
pub struct SimulationListResponse {
    pub simulation_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SimulationStateResponse {
    pub simulation_id: String,
    pub status: &'static str,
    #[serde(flatten)]
    pub snapshot: SnapshotDto,
}
