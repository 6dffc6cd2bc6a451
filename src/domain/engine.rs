// The lesion simulation engine.
//
// One engine owns one lesion. It is synchronous and single-threaded: the
// driver calls `LesionEngine::update` once per tick and may call the setters
// and manual stage operations between ticks. Parameter writes are only read at
// the start of the next `update`.

use tracing::{debug, info, warn};

use crate::domain::errors::EngineError;
use crate::domain::params::{ControlParameters, ParamName};
use crate::domain::stage::Stage;
use crate::domain::state::{BiologicalLevels, DerivedRates, LesionSnapshot};
use crate::domain::systems::integration::{TickInputs, integrate};
use crate::domain::systems::manual::{apply_entry, stage_seed};
use crate::domain::systems::rates::{derive_rates, smooth_medication};
use crate::domain::systems::transitions::next_stage;
use crate::domain::tuning::RateTuning;

pub const ACCELERATOR_MIN: f64 = 0.1;
pub const ACCELERATOR_MAX: f64 = 10.0;
pub const DEFAULT_ACCELERATOR: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct LesionEngine {
    params: ControlParameters,
    tuning: RateTuning,
    levels: BiologicalLevels,
    rates: DerivedRates,
    stage: Stage,
    simulation_time: f64,
    progression_accelerator: f64,
}

impl Default for LesionEngine {
    fn default() -> Self {
        Self::new(ControlParameters::default())
    }
}

impl LesionEngine {
    pub fn new(params: ControlParameters) -> Self {
        Self::with_tuning(params, RateTuning::default())
    }

    pub fn with_tuning(params: ControlParameters, tuning: RateTuning) -> Self {
        Self {
            params,
            tuning,
            levels: BiologicalLevels::default(),
            rates: derive_rates(&params, &tuning, DEFAULT_ACCELERATOR),
            stage: Stage::default(),
            simulation_time: 0.0,
            progression_accelerator: DEFAULT_ACCELERATOR,
        }
    }

    /// Advance the simulation by `dt` hours.
    ///
    /// Derives rates, integrates the levels, then evaluates the transition
    /// table for the current stage. A negative or non-finite `dt` is treated
    /// as a zero-length tick.
    pub fn update(&mut self, dt: f64) {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!(dt, "invalid tick length; treating as zero");
            0.0
        };

        self.rates = derive_rates(&self.params, &self.tuning, self.progression_accelerator);
        self.levels.medication = smooth_medication(self.levels.medication, &self.params, &self.tuning);
        self.levels.clamp_all();

        let promoted = integrate(
            &mut self.levels,
            &mut self.stage,
            TickInputs {
                params: &self.params,
                rates: &self.rates,
                tuning: &self.tuning,
                accelerator: self.progression_accelerator,
                dt,
            },
        );
        self.simulation_time += dt;

        if let Some(change) = promoted {
            info!(
                from = %change.from,
                to = %change.to,
                simulation_time = self.simulation_time,
                healing_progress = self.levels.healing_progress,
                "lesion settled early; stage transition"
            );
        }

        if let Some(next) = next_stage(self.stage, &self.levels) {
            info!(
                from = %self.stage,
                to = %next,
                simulation_time = self.simulation_time,
                "stage transition"
            );
            self.stage = next;
        }
    }

    /// Store a control value clamped to 0..=1000; returns the stored value.
    pub fn set_param(&mut self, name: ParamName, value: i64) -> u16 {
        self.params.set(name, value)
    }

    pub fn set_sebum_param(&mut self, value: i64) -> u16 {
        self.set_param(ParamName::Sebum, value)
    }

    pub fn set_bacteria_param(&mut self, value: i64) -> u16 {
        self.set_param(ParamName::Bacteria, value)
    }

    pub fn set_medication_param(&mut self, value: i64) -> u16 {
        self.set_param(ParamName::Medication, value)
    }

    pub fn set_inflammation_param(&mut self, value: i64) -> u16 {
        self.set_param(ParamName::Inflammation, value)
    }

    pub fn set_healing_param(&mut self, value: i64) -> u16 {
        self.set_param(ParamName::Healing, value)
    }

    pub fn set_temperature_param(&mut self, value: i64) -> u16 {
        self.set_param(ParamName::Temperature, value)
    }

    pub fn set_humidity_param(&mut self, value: i64) -> u16 {
        self.set_param(ParamName::Humidity, value)
    }

    pub fn set_friction_param(&mut self, value: i64) -> u16 {
        self.set_param(ParamName::Friction, value)
    }

    /// Place the lesion directly into `stage` and seed mid-stage levels.
    pub fn set_stage(&mut self, stage: Stage) {
        debug!(from = %self.stage, to = %stage, "stage set manually");
        self.stage = stage;
        self.reset_stage_progress();
    }

    /// Parse `name` and set the stage. Unknown names leave the engine untouched.
    pub fn set_stage_by_name(&mut self, name: &str) -> Result<(), EngineError> {
        let stage = Stage::parse_name(name)?;
        self.set_stage(stage);
        Ok(())
    }

    fn reset_stage_progress(&mut self) {
        stage_seed(self.stage).apply(&mut self.levels);
    }

    /// Skip one step along the forward path and return the new stage.
    ///
    /// From `resolved` this wraps to a fresh `incubation`.
    pub fn advance_to_next_stage(&mut self) -> Stage {
        let from = self.stage;
        let to = from.forward_successor();

        if to == Stage::Incubation {
            self.reset();
        } else {
            apply_entry(&mut self.levels, from, to);
            self.stage = to;
        }

        debug!(from = %from, to = %to, "stage advanced manually");
        to
    }

    /// Restore levels, stage and simulation time. Parameters and the
    /// accelerator are user intent and survive.
    pub fn reset(&mut self) {
        self.levels = BiologicalLevels::default();
        self.stage = Stage::default();
        self.simulation_time = 0.0;
        self.rates = derive_rates(&self.params, &self.tuning, self.progression_accelerator);
        debug!("engine reset");
    }

    /// Clamp `value` to 0.1..=10 and store it; returns the stored value.
    pub fn set_progression_accelerator(&mut self, value: f64) -> f64 {
        if !value.is_finite() {
            warn!(value, "ignoring non-finite progression accelerator");
            return self.progression_accelerator;
        }

        let clamped = value.clamp(ACCELERATOR_MIN, ACCELERATOR_MAX);
        if clamped != value {
            debug!(requested = value, clamped, "progression accelerator clamped");
        }
        self.progression_accelerator = clamped;
        clamped
    }

    pub fn params(&self) -> &ControlParameters {
        &self.params
    }

    pub fn levels(&self) -> &BiologicalLevels {
        &self.levels
    }

    /// Rates derived on the most recent tick.
    pub fn rates(&self) -> &DerivedRates {
        &self.rates
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    pub fn progression_accelerator(&self) -> f64 {
        self.progression_accelerator
    }

    pub fn snapshot(&self) -> LesionSnapshot {
        LesionSnapshot {
            stage: self.stage,
            simulation_time: self.simulation_time,
            levels: self.levels,
            rates: self.rates,
            params: self.params,
            progression_accelerator: self.progression_accelerator,
        }
    }
}
