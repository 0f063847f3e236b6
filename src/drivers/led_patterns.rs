//! Blink patterns for the warning LED, one per risk level.
//!
//! A pattern is a repeating list of hold durations.  The LED turns on
//! when the pattern starts and toggles after each duration elapses.
//!
//! | Level    | Pattern (on, off)  | Rate                       |
//! |----------|--------------------|----------------------------|
//! | low      | (none)             | steady off                 |
//! | moderate | 500 ms, 5000 ms    | one flash every 5.5 s      |
//! | elevated | 100 ms, 1000 ms    | short flash, ~1 Hz         |
//! | HIGH     | 50 ms, 500 ms      | ~2 Hz                      |
//! | SEVERE   | 50 ms, 250 ms      | ~3 Hz                      |
//! | EXTREME  | 50 ms, 50 ms       | 10 Hz                      |
//!
//! Patterns with fewer than two steps mean "steady off".
//!
//! The standalone LED tool also takes patterns on the command line: a
//! preset name (`heartbeat500`, `heartbeat1000`, `heartbeat5000`,
//! `fastblink`) or a list of durations such as `100ms 1.5s`.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::risk::RiskLevel;
use crate::error::ConfigError;

/// Repeating hold durations, serialised as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<u64>", into = "Vec<u64>")]
pub struct Pattern(Vec<Duration>);

impl Pattern {
    pub fn from_millis(steps: &[u64]) -> Self {
        Self(steps.iter().map(|&ms| Duration::from_millis(ms)).collect())
    }

    /// Steady off.
    pub fn off() -> Self {
        Self(Vec::new())
    }

    /// Whether this pattern toggles the LED at all.
    pub fn blinks(&self) -> bool {
        self.0.len() >= 2
    }

    pub fn steps(&self) -> &[Duration] {
        &self.0
    }

    /// One full cycle of the pattern.
    pub fn period(&self) -> Duration {
        self.0.iter().sum()
    }

    pub fn preset(name: &str) -> Option<Self> {
        let steps: &[u64] = match name {
            "heartbeat500" => &[100, 500],
            "heartbeat1000" => &[100, 1000],
            "heartbeat5000" => &[100, 5000],
            "fastblink" => &[100, 100],
            _ => return None,
        };
        Some(Self::from_millis(steps))
    }

    /// Build a pattern from command-line words.
    ///
    /// No words gives `heartbeat1000`; a single word may name a preset.
    /// A single duration toggles at that rate, i.e. equal on and off.
    pub fn parse_args<S: AsRef<str>>(words: &[S]) -> Result<Self, ConfigError> {
        match words {
            [] => Ok(Self::from_millis(&[100, 1000])),
            [only] => match Self::preset(only.as_ref()) {
                Some(p) => Ok(p),
                None => {
                    let step = parse_step(only.as_ref())?;
                    Ok(Self(vec![step, step]))
                }
            },
            _ => words
                .iter()
                .map(|w| parse_step(w.as_ref()))
                .collect::<Result<Vec<_>, _>>()
                .map(Self),
        }
    }
}

/// Parse one step such as `50ms`, `1.5s`, `2m` or `800us`.  Zero is
/// rejected.
pub fn parse_step(text: &str) -> Result<Duration, ConfigError> {
    const BAD: ConfigError = ConfigError::ValidationFailed("step must look like 100ms, 1.5s or 2m");

    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let micros_per_unit = match unit {
        "us" | "µs" => 1.0,
        "ms" => 1e3,
        "s" => 1e6,
        "m" => 60e6,
        _ => return Err(BAD),
    };
    let value: f64 = number.parse().map_err(|_| BAD)?;
    let micros = (value * micros_per_unit).round();
    if micros < 1.0 {
        return Err(ConfigError::ValidationFailed(
            "blink pattern step must be longer than 0 ms",
        ));
    }
    Ok(Duration::from_micros(micros as u64))
}

impl From<Vec<u64>> for Pattern {
    fn from(steps: Vec<u64>) -> Self {
        Self::from_millis(&steps)
    }
}

impl From<Pattern> for Vec<u64> {
    fn from(p: Pattern) -> Self {
        p.0.iter().map(|d| d.as_millis() as u64).collect()
    }
}

/// Pattern for every risk level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternTable {
    pub low: Pattern,
    pub moderate: Pattern,
    pub elevated: Pattern,
    pub high: Pattern,
    pub severe: Pattern,
    pub extreme: Pattern,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self {
            low: Pattern::off(),
            moderate: Pattern::from_millis(&[500, 5000]),
            elevated: Pattern::from_millis(&[100, 1000]),
            high: Pattern::from_millis(&[50, 500]),
            severe: Pattern::from_millis(&[50, 250]),
            extreme: Pattern::from_millis(&[50, 50]),
        }
    }
}

impl PatternTable {
    pub fn get(&self, level: RiskLevel) -> &Pattern {
        match level {
            RiskLevel::Low => &self.low,
            RiskLevel::Moderate => &self.moderate,
            RiskLevel::Elevated => &self.elevated,
            RiskLevel::High => &self.high,
            RiskLevel::Severe => &self.severe,
            RiskLevel::Extreme => &self.extreme,
        }
    }

    /// Reject blinking patterns containing a zero-length step, which would
    /// spin the blink thread.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = RiskLevel::ALL.iter().all(|&level| {
            let p = self.get(level);
            !p.blinks() || p.steps().iter().all(|d| !d.is_zero())
        });
        if ok {
            Ok(())
        } else {
            Err(ConfigError::ValidationFailed(
                "blink pattern step must be longer than 0 ms",
            ))
        }
    }
}
