//! Simulated DHTxx sensor.
//!
//! Produces real pulse trains for a slowly drifting climate, so the full
//! decode and retry path runs on a development machine.  A configurable
//! share of captures is corrupted the way a noisy line corrupts them.
//! [`SimulatedPin`] stands in for the warning LED line.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::PulseCapture;
use crate::error::SensorError;
use crate::sensors::dht::{MIN_CAPTURE, encode, synthesize};
use crate::sensors::{Level, PulseTrain, Reading, SensorFamily};

/// Share of captures that come back damaged.
pub const DEFAULT_CORRUPTION: f64 = 0.15;

pub struct SimulatedCapture {
    family: SensorFamily,
    climate: Reading,
    corruption: f64,
    rng: StdRng,
}

impl SimulatedCapture {
    pub fn new(family: SensorFamily, seed: u64) -> Self {
        Self {
            family,
            climate: Reading {
                temperature: 21.0,
                humidity: 45.0,
            },
            corruption: DEFAULT_CORRUPTION,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Share of captures to damage; clamped to [0, 1].
    pub fn with_corruption(mut self, share: f64) -> Self {
        self.corruption = share.clamp(0.0, 1.0);
        self
    }

    pub fn climate(&self) -> Reading {
        self.climate
    }

    fn drift(&mut self) {
        let t = self.climate.temperature + self.rng.gen_range(-0.2..=0.2);
        let h = self.climate.humidity + self.rng.gen_range(-1.5..=1.5);
        self.climate = Reading {
            temperature: t.clamp(-10.0, 40.0),
            humidity: h.clamp(5.0, 98.0),
        };
    }

    fn corrupt(&mut self, train: &mut PulseTrain) {
        match self.rng.gen_range(0..4) {
            // Lost edges.
            0 => {
                let keep = self.rng.gen_range(40..MIN_CAPTURE);
                train.truncate(keep);
            }
            // Bit flip: checksum no longer matches.
            1 => {
                let i = self.rng.gen_range(0..40) * 2 + 1 + (train.len() - MIN_CAPTURE);
                let flipped = if train[i].duration.as_micros() > 47 { 26 } else { 70 };
                train[i].duration = core::time::Duration::from_micros(flipped);
            }
            // Stretched high pulse.
            2 => {
                let i = self.rng.gen_range(0..40) * 2 + 1 + (train.len() - MIN_CAPTURE);
                train[i].duration = core::time::Duration::from_micros(150);
            }
            // Glitch inverts an edge.
            _ => {
                let i = self.rng.gen_range(0..80) + (train.len() - MIN_CAPTURE);
                train[i].level = match train[i].level {
                    Level::Low => Level::High,
                    Level::High => Level::Low,
                };
            }
        }
    }
}

impl PulseCapture for SimulatedCapture {
    fn capture(&mut self) -> Result<PulseTrain, SensorError> {
        self.drift();
        let lead_in = self.rng.gen_range(0..=3);
        let mut train = synthesize(encode(self.family, self.climate), lead_in);
        if self.rng.gen_bool(self.corruption) {
            self.corrupt(&mut train);
        }
        Ok(train)
    }
}

/// Output pin that only traces its transitions.
#[derive(Debug, Default)]
pub struct SimulatedPin;

impl ErrorType for SimulatedPin {
    type Error = Infallible;
}

impl OutputPin for SimulatedPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        trace!("LED off");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        trace!("LED on");
        Ok(())
    }
}
