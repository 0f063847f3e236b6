//! Risk classification: humidity to an ordered severity tier.
//!
//! A [`ThreatTable`] is a list of strictly increasing upper bounds, each
//! paired with the level that applies below it, plus a terminal level for
//! everything at or above the last bound.  The default table is the
//! acoustic-guitar care chart:
//!
//! ```text
//!  %RH  0    10    20   25    35    42    55    70    85   90   100
//!       │ EXT │ SEV │ HI │ ELV │ MOD │ low │ MOD │ ELV │ HI │ SEV │ EXT…
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Severity tier, ordered from harmless to destructive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Moderate,
    Elevated,
    High,
    Severe,
    Extreme,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 6] = [
        Self::Low,
        Self::Moderate,
        Self::Elevated,
        Self::High,
        Self::Severe,
        Self::Extreme,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Elevated => "elevated",
            Self::High => "HIGH",
            Self::Severe => "SEVERE",
            Self::Extreme => "EXTREME",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a threat table: values strictly below `below` map to `level`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub below: f64,
    pub level: RiskLevel,
}

impl Threshold {
    pub const fn new(below: f64, level: RiskLevel) -> Self {
        Self { below, level }
    }
}

const LARRIVEE: [Threshold; 10] = [
    Threshold::new(10.0, RiskLevel::Extreme),
    Threshold::new(20.0, RiskLevel::Severe),
    Threshold::new(25.0, RiskLevel::High),
    Threshold::new(35.0, RiskLevel::Elevated),
    Threshold::new(42.0, RiskLevel::Moderate),
    Threshold::new(55.0, RiskLevel::Low),
    Threshold::new(70.0, RiskLevel::Moderate),
    Threshold::new(85.0, RiskLevel::Elevated),
    Threshold::new(90.0, RiskLevel::High),
    Threshold::new(100.0, RiskLevel::Severe),
];

/// Validated, sorted threshold table.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreatTable {
    thresholds: Vec<Threshold>,
    terminal: RiskLevel,
}

impl ThreatTable {
    /// Build a table, rejecting non-finite or non-increasing bounds.
    pub fn new(thresholds: Vec<Threshold>, terminal: RiskLevel) -> Result<Self, ConfigError> {
        for (i, t) in thresholds.iter().enumerate() {
            if !t.below.is_finite() {
                return Err(ConfigError::ValidationFailed("threat bound must be finite"));
            }
            if i > 0 && t.below <= thresholds[i - 1].below {
                return Err(ConfigError::UnsortedThresholds { index: i });
            }
        }
        Ok(Self {
            thresholds,
            terminal,
        })
    }

    /// Relative-humidity care table for solid-wood acoustic guitars.
    pub fn larrivee() -> Self {
        Self {
            thresholds: LARRIVEE.to_vec(),
            terminal: RiskLevel::Extreme,
        }
    }

    pub fn default_thresholds() -> Vec<Threshold> {
        LARRIVEE.to_vec()
    }

    /// Level of the first bound strictly above `value`, else the terminal.
    pub fn classify(&self, value: f64) -> RiskLevel {
        self.thresholds
            .iter()
            .find(|t| value < t.below)
            .map_or(self.terminal, |t| t.level)
    }

    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }

    pub fn terminal(&self) -> RiskLevel {
        self.terminal
    }
}

impl Default for ThreatTable {
    fn default() -> Self {
        Self::larrivee()
    }
}
