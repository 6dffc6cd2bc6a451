// State integrator: advances the biological levels by one tick.
//
// Step order matters; each step reads the levels already updated by the steps
// before it in the same tick:
//
// 1. sebum
// 2. bacteria (bootstrap seeding, multiplicative growth, medication kill)
// 3. inflammation and neutrophils
// 4. pus
// 5. healing decay
//
// Levels are clamped after every step.

use crate::domain::params::{ControlParameters, PARAM_NEUTRAL, ParamName};
use crate::domain::stage::Stage;
use crate::domain::state::{BiologicalLevels, DerivedRates, StageChange};
use crate::domain::tuning::RateTuning;
use crate::domain::tuning::thresholds::{BACTERIA_THRESHOLD, INFLAMMATION_THRESHOLD};

#[derive(Debug, Clone, Copy)]
pub struct TickInputs<'a> {
    pub params: &'a ControlParameters,
    pub rates: &'a DerivedRates,
    pub tuning: &'a RateTuning,
    pub accelerator: f64,
    pub dt: f64,
}

/// Run all integration steps.
///
/// Returns the early `healing -> resolved` promotion when the healing step
/// triggers it. That promotion is the one place where a level update changes
/// the stage outside the transition table.
pub fn integrate(levels: &mut BiologicalLevels, stage: &mut Stage, inputs: TickInputs<'_>) -> Option<StageChange> {
    step_sebum(levels, inputs);
    step_bacteria(levels, inputs);
    step_inflammation(levels, *stage, inputs);
    step_pus(levels, *stage, inputs);
    step_healing(levels, stage, inputs)
}

fn step_sebum(levels: &mut BiologicalLevels, inputs: TickInputs<'_>) {
    let slider = inputs.params.value(ParamName::Sebum) / PARAM_NEUTRAL;
    levels.sebum += inputs.rates.sebum_rate * slider * inputs.dt;
    levels.clamp_all();
}

fn step_bacteria(levels: &mut BiologicalLevels, inputs: TickInputs<'_>) {
    let tuning = inputs.tuning;

    if levels.bacteria > 0.0 {
        levels.bacteria += levels.bacteria * inputs.rates.bacteria_growth_rate * inputs.dt;
    } else {
        // Bootstrap colonisation; not scaled by the accelerator.
        let slider = inputs.params.value(ParamName::Bacteria);
        levels.bacteria += slider / 100.0 * inputs.dt * tuning.bacteria_seed_factor;
    }

    let medication = inputs.params.value(ParamName::Medication);
    levels.bacteria = (levels.bacteria - medication / tuning.medication_kill_divisor * inputs.dt).max(0.0);
    levels.clamp_all();
}

fn step_inflammation(levels: &mut BiologicalLevels, stage: Stage, inputs: TickInputs<'_>) {
    let tuning = inputs.tuning;
    let active = levels.bacteria > BACTERIA_THRESHOLD || matches!(stage, Stage::Comedone | Stage::Papule);
    if !active {
        return;
    }

    let excess = levels.bacteria.max(tuning.inflammation_bacteria_floor) - tuning.inflammation_bacteria_floor;
    let slider = inputs.params.value(ParamName::Inflammation) / PARAM_NEUTRAL;
    let rate = excess / tuning.inflammation_bacteria_span * slider * inputs.dt * inputs.accelerator;

    levels.inflammation += rate;
    if levels.inflammation > INFLAMMATION_THRESHOLD / 2.0 {
        levels.neutrophils += rate * 2.0;
    }
    levels.clamp_all();
}

fn step_pus(levels: &mut BiologicalLevels, stage: Stage, inputs: TickInputs<'_>) {
    let tuning = inputs.tuning;
    if levels.neutrophils <= tuning.pus_neutrophil_floor || !matches!(stage, Stage::Papule | Stage::Pustule) {
        return;
    }

    levels.pus += levels.neutrophils / tuning.pus_neutrophil_divisor * inputs.dt * inputs.accelerator;
    levels.clamp_all();
}

fn step_healing(levels: &mut BiologicalLevels, stage: &mut Stage, inputs: TickInputs<'_>) -> Option<StageChange> {
    let tuning = inputs.tuning;
    if !matches!(*stage, Stage::Healing | Stage::Resolved) {
        return None;
    }

    let rate = inputs.params.value(ParamName::Healing) / PARAM_NEUTRAL * inputs.dt;
    levels.inflammation -= rate;
    levels.neutrophils -= rate * tuning.neutrophil_healing_factor;
    levels.pus -= rate * tuning.pus_healing_factor;
    levels.healing_progress += rate;
    levels.clamp_all();

    let settled =
        levels.inflammation < tuning.resolve_inflammation_ceiling && levels.pus < tuning.resolve_pus_ceiling;
    if *stage == Stage::Healing && settled {
        *stage = Stage::Resolved;
        return Some(StageChange {
            from: Stage::Healing,
            to: Stage::Resolved,
        });
    }

    None
}
