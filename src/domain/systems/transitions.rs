// Automatic stage transitions.
//
// The table is evaluated after integration, only for rows leaving the current
// stage, first match wins, so a tick moves at most one stage. `worsening` and
// `resolved` have no rows.

use crate::domain::stage::Stage;
use crate::domain::state::BiologicalLevels;
use crate::domain::tuning::thresholds::{
    BACTERIA_THRESHOLD, HEALING_THRESHOLD, INFLAMMATION_THRESHOLD, PUS_THRESHOLD, RESOLVED_THRESHOLD,
    RUPTURE_THRESHOLD,
};

pub struct Transition {
    pub from: Stage,
    pub to: Stage,
    pub guard: fn(&BiologicalLevels) -> bool,
}

pub const TRANSITIONS: &[Transition] = &[
    Transition {
        from: Stage::Incubation,
        to: Stage::Comedone,
        guard: |l| l.bacteria > BACTERIA_THRESHOLD && l.inflammation > INFLAMMATION_THRESHOLD,
    },
    Transition {
        from: Stage::Comedone,
        to: Stage::Papule,
        guard: |l| l.inflammation > INFLAMMATION_THRESHOLD,
    },
    Transition {
        from: Stage::Papule,
        to: Stage::Pustule,
        guard: |l| l.pus > PUS_THRESHOLD,
    },
    Transition {
        from: Stage::Pustule,
        to: Stage::Rupture,
        guard: |l| l.pus > RUPTURE_THRESHOLD,
    },
    Transition {
        from: Stage::Rupture,
        to: Stage::Healing,
        guard: |l| l.healing_progress > HEALING_THRESHOLD,
    },
    // Inflammation is compared against the bacteria threshold here, not the
    // inflammation threshold. Kept as modelled; see DESIGN.md.
    Transition {
        from: Stage::Rupture,
        to: Stage::Worsening,
        guard: |l| l.bacteria > BACTERIA_THRESHOLD || l.inflammation > BACTERIA_THRESHOLD,
    },
    Transition {
        from: Stage::Healing,
        to: Stage::Resolved,
        guard: |l| l.healing_progress >= RESOLVED_THRESHOLD,
    },
];

/// Stage the lesion moves to from `stage`, if any row fires.
pub fn next_stage(stage: Stage, levels: &BiologicalLevels) -> Option<Stage> {
    TRANSITIONS
        .iter()
        .filter(|t| t.from == stage)
        .find(|t| (t.guard)(levels))
        .map(|t| t.to)
}
