use crate::domain::params::{ControlParameters, PARAM_NEUTRAL, ParamName};
use crate::domain::state::DerivedRates;
use crate::domain::tuning::RateTuning;

/// Map the control parameters to this tick's rates.
///
/// Pure function of the sliders and the progression accelerator; the only
/// cross-tick state (the smoothed medication level) is handled by
/// [`smooth_medication`].
pub fn derive_rates(params: &ControlParameters, tuning: &RateTuning, accelerator: f64) -> DerivedRates {
    let temperature_offset = params.value(ParamName::Temperature) - PARAM_NEUTRAL;
    let medication = params.value(ParamName::Medication);

    let sebum_rate = tuning.sebum_base_rate
        * (1.0 + tuning.sebum_temperature_sensitivity * temperature_offset)
        * accelerator;

    let bacteria_growth_rate = tuning.bacteria_base_rate
        * (1.0 + tuning.bacteria_temperature_sensitivity * temperature_offset)
        * (1.0 - medication / tuning.medication_growth_divisor)
        * accelerator;

    let friction = params.value(ParamName::Friction);
    let baseline_inflammation = ((friction - tuning.friction_floor) / tuning.friction_divisor).max(0.0);

    let humidity = params.value(ParamName::Humidity);
    let humidity_effect = if humidity < tuning.humidity_floor {
        1.0
    } else {
        1.0 + (humidity - tuning.humidity_floor) / tuning.humidity_divisor
    };

    DerivedRates {
        // All factors stay positive on the 0..=1000 slider scale; the max guards tuning overrides.
        sebum_rate: sebum_rate.max(0.0),
        bacteria_growth_rate: bacteria_growth_rate.max(0.0),
        baseline_inflammation,
        humidity_effect,
    }
}

/// First-order low-pass filter of the medication slider (one step per tick).
pub fn smooth_medication(current: f64, params: &ControlParameters, tuning: &RateTuning) -> f64 {
    let weight = tuning.medication_smoothing;
    current * (1.0 - weight) + params.value(ParamName::Medication) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn when_params_are_neutral_then_rates_equal_base_rates() {
        let params = ControlParameters::default();
        let rates = derive_rates(&params, &RateTuning::default(), 1.0);

        assert!(approx(rates.sebum_rate, 0.05), "sebum_rate = {}", rates.sebum_rate);
        assert!(approx(rates.bacteria_growth_rate, 0.05));
        assert!(approx(rates.baseline_inflammation, 0.0));
        assert!(approx(rates.humidity_effect, 1.0));
    }

    #[test]
    fn when_temperature_rises_then_sebum_reacts_twice_as_strongly_as_bacteria() {
        let params = ControlParameters {
            temperature: 1000,
            ..ControlParameters::default()
        };
        let rates = derive_rates(&params, &RateTuning::default(), 1.0);

        assert!(approx(rates.sebum_rate, 0.05 * 2.0));
        assert!(approx(rates.bacteria_growth_rate, 0.05 * 1.5));
    }

    #[test]
    fn when_medication_is_maxed_then_bacterial_growth_is_halved() {
        let params = ControlParameters {
            medication: 1000,
            ..ControlParameters::default()
        };
        let rates = derive_rates(&params, &RateTuning::default(), 1.0);

        assert!(approx(rates.bacteria_growth_rate, 0.025));
    }

    #[test]
    fn when_accelerator_is_applied_then_both_growth_rates_scale() {
        let params = ControlParameters::default();
        let rates = derive_rates(&params, &RateTuning::default(), 4.0);

        assert!(approx(rates.sebum_rate, 0.2));
        assert!(approx(rates.bacteria_growth_rate, 0.2));
    }

    #[test]
    fn baseline_inflammation_is_zero_up_to_friction_300_and_near_half_at_max() {
        let tuning = RateTuning::default();
        for (friction, expected) in [(0, 0.0), (300, 0.0), (1000, 0.5)] {
            let params = ControlParameters {
                friction,
                ..ControlParameters::default()
            };
            let rates = derive_rates(&params, &tuning, 1.0);
            assert!(
                approx(rates.baseline_inflammation, expected),
                "friction {friction}: {}",
                rates.baseline_inflammation
            );
        }
    }

    #[test]
    fn humidity_effect_is_flat_below_600_and_caps_at_one_and_a_half() {
        let tuning = RateTuning::default();
        for (humidity, expected) in [(0, 1.0), (599, 1.0), (600, 1.0), (1000, 1.5)] {
            let params = ControlParameters {
                humidity,
                ..ControlParameters::default()
            };
            let rates = derive_rates(&params, &tuning, 1.0);
            assert!(
                approx(rates.humidity_effect, expected),
                "humidity {humidity}: {}",
                rates.humidity_effect
            );
        }
    }

    #[test]
    fn when_medication_is_held_then_smoothed_level_approaches_without_overshoot() {
        let params = ControlParameters {
            medication: 80,
            ..ControlParameters::default()
        };
        let tuning = RateTuning::default();

        let mut level = 0.0;
        let mut previous = level;
        for _ in 0..1000 {
            level = smooth_medication(level, &params, &tuning);
            assert!(level >= previous && level <= 80.0, "level = {level}");
            previous = level;
        }

        assert!((80.0 - level).abs() < 0.01, "level = {level}");
        let after_one = smooth_medication(0.0, &params, &tuning);
        assert!(approx(after_one, 0.8));
    }
}
