// Fixed thresholds gating automatic stage transitions.
//
// These are engine-wide constants shared by every simulation instance and are
// never mutated at runtime. All values are on the 0..=100 level scale.

/// Sebum level treated as a clogged pore (comedone entry floor).
pub const SEBUM_THRESHOLD: f64 = 70.0;

/// Bacterial load that starts the inflammatory response.
pub const BACTERIA_THRESHOLD: f64 = 60.0;

/// Inflammation level separating a comedone from a papule.
pub const INFLAMMATION_THRESHOLD: f64 = 40.0;

/// Pus level at which a papule becomes a pustule.
pub const PUS_THRESHOLD: f64 = 70.0;

/// Pus level at which a pustule ruptures.
pub const RUPTURE_THRESHOLD: f64 = 90.0;

/// Healing progress needed to leave rupture towards healing.
pub const HEALING_THRESHOLD: f64 = 30.0;

/// Healing progress at which a healing lesion is resolved.
pub const RESOLVED_THRESHOLD: f64 = 80.0;

/// Upper bound for every biological level.
pub const LEVEL_MAX: f64 = 100.0;

/// Clamp a level into `0.0..=LEVEL_MAX`.
pub fn clamp_level(value: f64) -> f64 {
    value.clamp(0.0, LEVEL_MAX)
}
