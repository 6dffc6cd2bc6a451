// Parameter store: the eight user-adjustable control values.
//
// Values live on a 0..=1000 integer scale. Out-of-range writes are clamped and
// logged, never rejected. Rates are not recomputed on write; the engine reads
// the store at the start of the next tick.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::domain::errors::EngineError;

pub const PARAM_MIN: u16 = 0;
pub const PARAM_MAX: u16 = 1000;

/// Slider value treated as neutral by the rate formulas.
pub const PARAM_NEUTRAL: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamName {
    Sebum,
    Bacteria,
    Medication,
    Inflammation,
    Healing,
    Temperature,
    Humidity,
    Friction,
}

impl ParamName {
    pub const ALL: [ParamName; 8] = [
        ParamName::Sebum,
        ParamName::Bacteria,
        ParamName::Medication,
        ParamName::Inflammation,
        ParamName::Healing,
        ParamName::Temperature,
        ParamName::Humidity,
        ParamName::Friction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamName::Sebum => "sebum",
            ParamName::Bacteria => "bacteria",
            ParamName::Medication => "medication",
            ParamName::Inflammation => "inflammation",
            ParamName::Healing => "healing",
            ParamName::Temperature => "temperature",
            ParamName::Humidity => "humidity",
            ParamName::Friction => "friction",
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| EngineError::UnknownParameter(s.to_string()))
    }
}

/// Current slider positions. Persist across engine resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlParameters {
    pub sebum: u16,
    pub bacteria: u16,
    pub medication: u16,
    pub inflammation: u16,
    pub healing: u16,
    pub temperature: u16,
    pub humidity: u16,
    pub friction: u16,
}

impl Default for ControlParameters {
    fn default() -> Self {
        Self {
            sebum: 500,
            bacteria: 200,
            medication: 0,
            inflammation: 500,
            healing: 500,
            temperature: 500,
            humidity: 500,
            friction: 300,
        }
    }
}

impl ControlParameters {
    pub fn get(&self, name: ParamName) -> u16 {
        match name {
            ParamName::Sebum => self.sebum,
            ParamName::Bacteria => self.bacteria,
            ParamName::Medication => self.medication,
            ParamName::Inflammation => self.inflammation,
            ParamName::Healing => self.healing,
            ParamName::Temperature => self.temperature,
            ParamName::Humidity => self.humidity,
            ParamName::Friction => self.friction,
        }
    }

    /// Slider value as `f64` for the rate formulas.
    pub fn value(&self, name: ParamName) -> f64 {
        f64::from(self.get(name))
    }

    /// Store `value` clamped into `PARAM_MIN..=PARAM_MAX`; returns the stored value.
    pub fn set(&mut self, name: ParamName, value: i64) -> u16 {
        let clamped = clamp_param(value);
        if i64::from(clamped) != value {
            debug!(param = %name, requested = value, clamped, "parameter clamped");
        }

        let slot = match name {
            ParamName::Sebum => &mut self.sebum,
            ParamName::Bacteria => &mut self.bacteria,
            ParamName::Medication => &mut self.medication,
            ParamName::Inflammation => &mut self.inflammation,
            ParamName::Healing => &mut self.healing,
            ParamName::Temperature => &mut self.temperature,
            ParamName::Humidity => &mut self.humidity,
            ParamName::Friction => &mut self.friction,
        };
        *slot = clamped;
        clamped
    }
}

fn clamp_param(value: i64) -> u16 {
    // The clamp bounds fit in u16, so the cast cannot truncate.
    value.clamp(i64::from(PARAM_MIN), i64::from(PARAM_MAX)) as u16
}
