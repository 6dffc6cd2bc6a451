// Clinical stages of lesion progression.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::domain::errors::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Incubation,
    Comedone,
    Papule,
    Pustule,
    Rupture,
    Healing,
    Worsening,
    Resolved,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Incubation,
        Stage::Comedone,
        Stage::Papule,
        Stage::Pustule,
        Stage::Rupture,
        Stage::Healing,
        Stage::Worsening,
        Stage::Resolved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Incubation => "incubation",
            Stage::Comedone => "comedone",
            Stage::Papule => "papule",
            Stage::Pustule => "pustule",
            Stage::Rupture => "rupture",
            Stage::Healing => "healing",
            Stage::Worsening => "worsening",
            Stage::Resolved => "resolved",
        }
    }

    /// Next stage on the manual skip-ahead path.
    ///
    /// The path is cyclic: `resolved` wraps to `incubation`. `worsening` is off
    /// the canonical path and skips to `healing`, as if treatment had begun.
    pub fn forward_successor(self) -> Stage {
        match self {
            Stage::Incubation => Stage::Comedone,
            Stage::Comedone => Stage::Papule,
            Stage::Papule => Stage::Pustule,
            Stage::Pustule => Stage::Rupture,
            Stage::Rupture => Stage::Healing,
            Stage::Healing => Stage::Resolved,
            Stage::Worsening => Stage::Healing,
            Stage::Resolved => Stage::Incubation,
        }
    }

    /// Parse a stage name coming from a client. Rejections are logged here so
    /// every entry point reports them the same way.
    pub fn parse_name(name: &str) -> Result<Stage, EngineError> {
        name.parse::<Stage>().inspect_err(|e| {
            warn!(stage = name, error = %e, "rejected stage change");
        })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| EngineError::InvalidStage(s.to_string()))
    }
}
