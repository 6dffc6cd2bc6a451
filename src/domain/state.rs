// Domain-level simulation state and snapshot types.

use crate::domain::params::ControlParameters;
use crate::domain::stage::Stage;
use crate::domain::tuning::thresholds::clamp_level;

/// Sebum present in a fresh pore.
pub const INITIAL_SEBUM_LEVEL: f64 = 20.0;

/// Simulated organism state, every field on the 0..=100 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiologicalLevels {
    pub sebum: f64,
    pub bacteria: f64,
    pub inflammation: f64,
    pub neutrophils: f64,
    pub pus: f64,

    // Low-pass filtered medication slider, saturating at the level ceiling.
    // Observed only; the rate formulas read the slider directly.
    pub medication: f64,

    // Cumulative recovery counter driving healing -> resolved.
    pub healing_progress: f64,
}

impl Default for BiologicalLevels {
    fn default() -> Self {
        Self {
            sebum: INITIAL_SEBUM_LEVEL,
            bacteria: 0.0,
            inflammation: 0.0,
            neutrophils: 0.0,
            pus: 0.0,
            medication: 0.0,
            healing_progress: 0.0,
        }
    }
}

impl BiologicalLevels {
    pub fn clamp_all(&mut self) {
        self.sebum = clamp_level(self.sebum);
        self.bacteria = clamp_level(self.bacteria);
        self.inflammation = clamp_level(self.inflammation);
        self.neutrophils = clamp_level(self.neutrophils);
        self.pus = clamp_level(self.pus);
        self.medication = clamp_level(self.medication);
        self.healing_progress = clamp_level(self.healing_progress);
    }
}

/// Addressable simulated level, used by the stage seeding tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Sebum,
    Bacteria,
    Inflammation,
    Neutrophils,
    Pus,
    HealingProgress,
}

impl BiologicalLevels {
    pub fn get(&self, level: Level) -> f64 {
        match level {
            Level::Sebum => self.sebum,
            Level::Bacteria => self.bacteria,
            Level::Inflammation => self.inflammation,
            Level::Neutrophils => self.neutrophils,
            Level::Pus => self.pus,
            Level::HealingProgress => self.healing_progress,
        }
    }

    pub fn slot_mut(&mut self, level: Level) -> &mut f64 {
        match level {
            Level::Sebum => &mut self.sebum,
            Level::Bacteria => &mut self.bacteria,
            Level::Inflammation => &mut self.inflammation,
            Level::Neutrophils => &mut self.neutrophils,
            Level::Pus => &mut self.pus,
            Level::HealingProgress => &mut self.healing_progress,
        }
    }
}

/// Rates derived from the control parameters at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedRates {
    pub sebum_rate: f64,
    pub bacteria_growth_rate: f64,
    pub baseline_inflammation: f64,
    pub humidity_effect: f64,
}

/// Everything a renderer needs after a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct LesionSnapshot {
    pub stage: Stage,
    pub simulation_time: f64,
    pub levels: BiologicalLevels,
    pub rates: DerivedRates,
    pub params: ControlParameters,
    pub progression_accelerator: f64,
}

/// A stage change observed across one engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageChange {
    pub from: Stage,
    pub to: Stage,
}
