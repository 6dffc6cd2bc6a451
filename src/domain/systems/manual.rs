// Level tables for the manual stage operations.
//
// `set_stage` seeds every simulated level from `stage_seed` so the lesion
// resumes plausibly mid-stage: levels that govern the stage's exit sit at 80%
// of the exit threshold, levels that govern its entry sit at the entry
// threshold. `advance_to_next_stage` only raises the destination's
// `entry_floors` and leaves the other levels alone.

use crate::domain::stage::Stage;
use crate::domain::state::{BiologicalLevels, INITIAL_SEBUM_LEVEL, Level};
use crate::domain::tuning::thresholds::{
    BACTERIA_THRESHOLD, HEALING_THRESHOLD, INFLAMMATION_THRESHOLD, PUS_THRESHOLD, RESOLVED_THRESHOLD,
    RUPTURE_THRESHOLD, SEBUM_THRESHOLD,
};

/// Fraction of the exit threshold used for mid-stage seeding.
pub const MID_STAGE_FRACTION: f64 = 0.8;

/// Simulated levels for a lesion placed directly into `stage`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageSeed {
    pub sebum: f64,
    pub bacteria: f64,
    pub inflammation: f64,
    pub neutrophils: f64,
    pub pus: f64,
    pub healing_progress: f64,
}

impl StageSeed {
    /// Overwrite the simulated levels; the smoothed medication level is kept.
    pub fn apply(&self, levels: &mut BiologicalLevels) {
        levels.sebum = self.sebum;
        levels.bacteria = self.bacteria;
        levels.inflammation = self.inflammation;
        levels.neutrophils = self.neutrophils;
        levels.pus = self.pus;
        levels.healing_progress = self.healing_progress;
    }
}

pub fn stage_seed(stage: Stage) -> StageSeed {
    let f = MID_STAGE_FRACTION;
    match stage {
        Stage::Incubation => StageSeed {
            sebum: INITIAL_SEBUM_LEVEL,
            bacteria: 0.0,
            inflammation: 0.0,
            neutrophils: 0.0,
            pus: 0.0,
            healing_progress: 0.0,
        },
        Stage::Comedone => StageSeed {
            sebum: SEBUM_THRESHOLD,
            bacteria: BACTERIA_THRESHOLD,
            inflammation: INFLAMMATION_THRESHOLD * f,
            neutrophils: 0.0,
            pus: 0.0,
            healing_progress: 0.0,
        },
        Stage::Papule => StageSeed {
            sebum: SEBUM_THRESHOLD,
            bacteria: BACTERIA_THRESHOLD,
            inflammation: INFLAMMATION_THRESHOLD,
            neutrophils: INFLAMMATION_THRESHOLD * f,
            pus: PUS_THRESHOLD * f,
            healing_progress: 0.0,
        },
        Stage::Pustule => StageSeed {
            sebum: SEBUM_THRESHOLD,
            bacteria: BACTERIA_THRESHOLD,
            inflammation: INFLAMMATION_THRESHOLD,
            neutrophils: INFLAMMATION_THRESHOLD * f,
            pus: RUPTURE_THRESHOLD * f,
            healing_progress: 0.0,
        },
        Stage::Rupture => StageSeed {
            sebum: SEBUM_THRESHOLD,
            bacteria: BACTERIA_THRESHOLD * f,
            inflammation: INFLAMMATION_THRESHOLD,
            neutrophils: INFLAMMATION_THRESHOLD * f,
            pus: RUPTURE_THRESHOLD,
            healing_progress: 0.0,
        },
        // Drained lesion: inflammation and pus above the early-resolve ceilings,
        // bacteria at the floor of the inflammatory response.
        Stage::Healing => StageSeed {
            sebum: SEBUM_THRESHOLD * f,
            bacteria: 30.0,
            inflammation: INFLAMMATION_THRESHOLD / 2.0,
            neutrophils: INFLAMMATION_THRESHOLD / 2.0,
            pus: INFLAMMATION_THRESHOLD / 2.0,
            healing_progress: RESOLVED_THRESHOLD * f,
        },
        Stage::Worsening => StageSeed {
            sebum: SEBUM_THRESHOLD,
            bacteria: BACTERIA_THRESHOLD,
            inflammation: BACTERIA_THRESHOLD,
            neutrophils: BACTERIA_THRESHOLD * f,
            pus: PUS_THRESHOLD * f,
            healing_progress: 0.0,
        },
        Stage::Resolved => StageSeed {
            sebum: INITIAL_SEBUM_LEVEL,
            bacteria: 0.0,
            inflammation: 0.0,
            neutrophils: 0.0,
            pus: 0.0,
            healing_progress: RESOLVED_THRESHOLD,
        },
    }
}

/// Margin added above a transition threshold so the strict `>` guards hold.
pub const ENTRY_MARGIN: f64 = 1.0;

/// Minimum levels a lesion holds right after a manual advance into `stage`.
///
/// Each value satisfies the transition-table guard for the edge that enters
/// `stage`, so `next_stage(previous, levels)` agrees with the manual step.
/// Comedone also carries the clogged-pore sebum floor.
pub fn entry_floors(stage: Stage) -> &'static [(Level, f64)] {
    match stage {
        Stage::Incubation => &[],
        Stage::Comedone => &[
            (Level::Sebum, SEBUM_THRESHOLD),
            (Level::Bacteria, BACTERIA_THRESHOLD + ENTRY_MARGIN),
            (Level::Inflammation, INFLAMMATION_THRESHOLD + ENTRY_MARGIN),
        ],
        Stage::Papule => &[(Level::Inflammation, INFLAMMATION_THRESHOLD + ENTRY_MARGIN)],
        Stage::Pustule => &[(Level::Pus, PUS_THRESHOLD + ENTRY_MARGIN)],
        Stage::Rupture => &[(Level::Pus, RUPTURE_THRESHOLD + ENTRY_MARGIN)],
        Stage::Healing => &[(Level::HealingProgress, HEALING_THRESHOLD + ENTRY_MARGIN)],
        Stage::Worsening => &[(Level::Bacteria, BACTERIA_THRESHOLD + ENTRY_MARGIN)],
        // healing -> resolved compares with `>=`.
        Stage::Resolved => &[(Level::HealingProgress, RESOLVED_THRESHOLD)],
    }
}

/// Raise the destination's floors, then apply the per-edge side effects.
///
/// Levels already above a floor are left as they are.
pub fn apply_entry(levels: &mut BiologicalLevels, from: Stage, to: Stage) {
    for &(level, floor) in entry_floors(to) {
        let slot = levels.slot_mut(level);
        *slot = slot.max(floor);
    }

    match (from, to) {
        (_, Stage::Rupture) => levels.healing_progress = 0.0,
        (Stage::Healing, Stage::Resolved) => {
            levels.inflammation = 0.0;
            levels.pus = 0.0;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::systems::transitions::next_stage;

    #[test]
    fn seeded_levels_stay_within_range() {
        for stage in Stage::ALL {
            let mut levels = BiologicalLevels::default();
            stage_seed(stage).apply(&mut levels);
            for level in [
                Level::Sebum,
                Level::Bacteria,
                Level::Inflammation,
                Level::Neutrophils,
                Level::Pus,
                Level::HealingProgress,
            ] {
                let value = levels.get(level);
                assert!((0.0..=100.0).contains(&value), "{stage} {level:?} = {value}");
            }
        }
    }

    #[test]
    fn seeded_stage_does_not_immediately_qualify_for_its_exit() {
        for stage in [
            Stage::Comedone,
            Stage::Papule,
            Stage::Pustule,
            Stage::Rupture,
            Stage::Healing,
        ] {
            let mut levels = BiologicalLevels::default();
            stage_seed(stage).apply(&mut levels);

            assert_eq!(next_stage(stage, &levels), None, "{stage} exits right after seeding");
        }
    }

    #[test]
    fn seeding_keeps_the_smoothed_medication_level() {
        let mut levels = BiologicalLevels {
            medication: 42.0,
            ..BiologicalLevels::default()
        };

        stage_seed(Stage::Pustule).apply(&mut levels);

        assert_eq!(levels.medication, 42.0);
        assert_eq!(levels.pus, 72.0);
    }

    #[test]
    fn when_advancing_into_comedone_then_sebum_bacteria_and_inflammation_are_raised() {
        let mut levels = BiologicalLevels::default();

        apply_entry(&mut levels, Stage::Incubation, Stage::Comedone);

        assert_eq!(levels.sebum, SEBUM_THRESHOLD);
        assert!(levels.bacteria > BACTERIA_THRESHOLD);
        assert!(levels.inflammation > INFLAMMATION_THRESHOLD);
        assert_eq!(next_stage(Stage::Incubation, &levels), Some(Stage::Comedone));
    }

    #[test]
    fn when_advancing_along_an_automatic_edge_then_the_table_guard_holds() {
        let edges = [
            (Stage::Incubation, Stage::Comedone),
            (Stage::Comedone, Stage::Papule),
            (Stage::Papule, Stage::Pustule),
            (Stage::Pustule, Stage::Rupture),
            (Stage::Rupture, Stage::Healing),
            (Stage::Healing, Stage::Resolved),
        ];

        for (from, to) in edges {
            let mut levels = BiologicalLevels::default();
            apply_entry(&mut levels, from, to);

            assert_eq!(next_stage(from, &levels), Some(to), "{from} -> {to}: {levels:?}");
        }
    }

    #[test]
    fn when_level_is_already_above_floor_then_advance_keeps_it() {
        let mut levels = BiologicalLevels {
            pus: 95.0,
            ..BiologicalLevels::default()
        };

        apply_entry(&mut levels, Stage::Papule, Stage::Pustule);

        assert_eq!(levels.pus, 95.0);
    }

    #[test]
    fn when_advancing_into_rupture_then_healing_progress_is_zeroed() {
        let mut levels = BiologicalLevels {
            healing_progress: 55.0,
            ..BiologicalLevels::default()
        };

        apply_entry(&mut levels, Stage::Pustule, Stage::Rupture);

        assert_eq!(levels.healing_progress, 0.0);
        assert_eq!(levels.pus, RUPTURE_THRESHOLD + ENTRY_MARGIN);
    }

    #[test]
    fn when_advancing_from_healing_into_resolved_then_inflammation_and_pus_clear() {
        let mut levels = BiologicalLevels {
            inflammation: 30.0,
            pus: 12.0,
            healing_progress: 35.0,
            ..BiologicalLevels::default()
        };

        apply_entry(&mut levels, Stage::Healing, Stage::Resolved);

        assert_eq!(levels.inflammation, 0.0);
        assert_eq!(levels.pus, 0.0);
        assert_eq!(levels.healing_progress, RESOLVED_THRESHOLD);
    }
}
