/// Base rates and sensitivities for the rate deriver and integrator.
///
/// Keep this separate from runtime/server configuration (tick interval, ports, etc.).
/// Slider-relative values use the 0..=1000 parameter scale, where 500 is neutral.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateTuning {
    /// Sebum production per hour at neutral temperature and sebum slider.
    pub sebum_base_rate: f64,

    /// Relative bacterial growth per hour at neutral temperature.
    pub bacteria_base_rate: f64,

    /// Sebum rate change per temperature unit away from neutral.
    pub sebum_temperature_sensitivity: f64,

    /// Bacterial rate change per temperature unit away from neutral.
    pub bacteria_temperature_sensitivity: f64,

    /// Medication slider value that would fully stop bacterial growth.
    pub medication_growth_divisor: f64,

    /// Medication slider divisor for the direct bactericidal effect.
    pub medication_kill_divisor: f64,

    /// Bootstrap colonisation factor applied while no bacteria are present.
    pub bacteria_seed_factor: f64,

    /// Bacterial floor below which no inflammation is produced.
    pub inflammation_bacteria_floor: f64,

    /// Bacterial span above the floor that maps to a full inflammation rate.
    pub inflammation_bacteria_span: f64,

    /// Neutrophil level above which pus starts forming.
    pub pus_neutrophil_floor: f64,

    /// Neutrophil divisor for the pus formation rate.
    pub pus_neutrophil_divisor: f64,

    /// Neutrophil decay relative to the healing rate.
    pub neutrophil_healing_factor: f64,

    /// Pus decay relative to the healing rate.
    pub pus_healing_factor: f64,

    /// Inflammation below which a healing lesion resolves early.
    pub resolve_inflammation_ceiling: f64,

    /// Pus below which a healing lesion resolves early.
    pub resolve_pus_ceiling: f64,

    /// Friction below which no baseline inflammation is derived.
    pub friction_floor: f64,

    /// Friction divisor for the baseline inflammation.
    pub friction_divisor: f64,

    /// Humidity below which the humidity multiplier stays at 1.
    pub humidity_floor: f64,

    /// Humidity divisor for the humidity multiplier.
    pub humidity_divisor: f64,

    /// Per-tick weight of the medication slider in the smoothed medication level.
    pub medication_smoothing: f64,
}

impl Default for RateTuning {
    fn default() -> Self {
        Self {
            sebum_base_rate: 0.05,
            bacteria_base_rate: 0.05,
            sebum_temperature_sensitivity: 0.002,
            bacteria_temperature_sensitivity: 0.001,
            medication_growth_divisor: 2000.0,
            medication_kill_divisor: 10_000.0,
            bacteria_seed_factor: 2.0,
            inflammation_bacteria_floor: 30.0,
            inflammation_bacteria_span: 40.0,
            pus_neutrophil_floor: 10.0,
            pus_neutrophil_divisor: 80.0,
            neutrophil_healing_factor: 1.2,
            pus_healing_factor: 0.8,
            resolve_inflammation_ceiling: 10.0,
            resolve_pus_ceiling: 5.0,
            friction_floor: 300.0,
            friction_divisor: 1400.0,
            humidity_floor: 600.0,
            humidity_divisor: 800.0,
            medication_smoothing: 0.01,
        }
    }
}
