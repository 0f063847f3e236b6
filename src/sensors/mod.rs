//! Sensor subsystem: the DHTxx protocol decoder and the read policies
//! layered around it.
//!
//! ```text
//!  PulseCapture ──▶ dht::decode ──▶ RetryingReader ──▶ MinIntervalGate ──▶ Reading
//! ```
//!
//! Everything below the capture port is pure and host-testable; only the
//! reader sleeps between attempts.

pub mod dht;
pub mod reader;

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Upper bound on pulses kept from one capture.  A valid DHTxx response
/// is 82–85 pulses; anything beyond this is noise and is truncated.
pub const MAX_PULSES: usize = 128;

/// Logic level of one captured half-cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// One electrical half-cycle captured from the sensor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub level: Level,
    pub duration: Duration,
}

impl Pulse {
    pub const fn low(us: u64) -> Self {
        Self {
            level: Level::Low,
            duration: Duration::from_micros(us),
        }
    }

    pub const fn high(us: u64) -> Self {
        Self {
            level: Level::High,
            duration: Duration::from_micros(us),
        }
    }
}

/// Pulses in emission order, as returned by a capture.
pub type PulseTrain = heapless::Vec<Pulse, MAX_PULSES>;

/// Which member of the DHTxx family is wired to the line.
///
/// | Family | Humidity            | Temperature                      |
/// |--------|---------------------|----------------------------------|
/// | DHT11  | `b0`                | `b2`                             |
/// | DHT22  | `(b0·256 + b1) / 10`| `((b2 & 0x7F)·256 + b3) / 10`, signed by `b2 & 0x80` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorFamily {
    Dht11,
    /// DHT22 and the pin-compatible AM2302.
    #[default]
    #[serde(alias = "am2302")]
    Dht22,
}

/// A validated decode: humidity is always within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature: f64,
    pub humidity: f64,
}
