//! DHTxx single-wire protocol decoder.
//!
//! After the host pulls the line low to request a reading, the sensor
//! answers with a short handshake followed by 40 data bits.  Each bit is a
//! ~50 µs low half-cycle and a high half-cycle whose width carries the bit:
//!
//! ```text
//!          ┌──┐              ┌───────┐
//!   ───────┘  └──────────────┘       └──   "0" ≈ 24 µs high
//!     low 50µs   high 24µs     low 50µs  high 70µs = "1"
//! ```
//!
//! | Threshold     | Value  | Meaning                                |
//! |---------------|--------|----------------------------------------|
//! | `HIGH_AVG`    | 47 µs  | above → bit 1, at or below → bit 0     |
//! | `HIGH_MAX`    | 97 µs  | above → corruption, reading rejected   |
//!
//! The decoder is a pure function; [`synthesize`] builds the matching
//! pulse train for a given frame so the whole path can be exercised
//! without hardware.

use core::time::Duration;

use log::debug;

use super::{Level, Pulse, PulseTrain, Reading, SensorFamily};
use crate::app::ports::{PulseCapture, ReadOnce};
use crate::error::{DecodeError, SensorError};

/// Data pulses per frame: 5 bytes × 8 bits × (low + high).
pub const DATA_PULSES: usize = 80;

/// Accepted capture lengths are `MIN_CAPTURE..=MAX_CAPTURE`; the excess
/// over `MIN_CAPTURE` is handshake lead-in and is skipped.
pub const MIN_CAPTURE: usize = 82;
pub const MAX_CAPTURE: usize = 85;

/// Midpoint between the long "1" high (70 µs) and the longest tolerated
/// stretch of it (124 µs).
const HIGH_MAX: Duration = Duration::from_micros((70 + 124) / 2);
/// Midpoint between the short "0" high (24 µs) and the long "1" high.
const HIGH_AVG: Duration = Duration::from_micros(24 + (70 - 24) / 2);

// Widths used when synthesising frames.
const SYNTH_LOW_US: u64 = 50;
const SYNTH_ZERO_US: u64 = 26;
const SYNTH_ONE_US: u64 = 70;
const SYNTH_HANDSHAKE_US: u64 = 80;

// ── Decoder ──────────────────────────────────────────────────

/// Decode a captured pulse train into a validated reading.
///
/// Never returns a partial reading: any framing, timing, checksum or range
/// violation rejects the whole capture.
pub fn decode(family: SensorFamily, pulses: &[Pulse]) -> Result<Reading, DecodeError> {
    let lead = match pulses.len() {
        n @ MIN_CAPTURE..=MAX_CAPTURE => n - MIN_CAPTURE,
        n => return Err(DecodeError::MalformedLength(n)),
    };
    let data = &pulses[lead..lead + DATA_PULSES];

    let mut bytes = [0u8; 5];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = decode_byte(data, i * 16, lead)?;
    }

    let expected = checksum(&bytes);
    if bytes[4] != expected {
        return Err(DecodeError::Checksum {
            expected,
            actual: bytes[4],
        });
    }

    let reading = reconstruct(family, &bytes);
    if reading.humidity > 100.0 {
        return Err(DecodeError::HumidityOutOfRange(reading.humidity));
    }
    Ok(reading)
}

/// Decode 8 bits (16 pulses) starting at `start`; `offset` maps indices
/// back onto the full capture for error reporting.
fn decode_byte(data: &[Pulse], start: usize, offset: usize) -> Result<u8, DecodeError> {
    let mut byte = 0u8;
    for bit in 0..8 {
        let i = start + bit * 2;
        let (low, high) = (data[i], data[i + 1]);

        if low.level != Level::Low {
            return Err(DecodeError::EdgeOrder {
                index: offset + i,
                expected: Level::Low,
            });
        }
        if high.level != Level::High {
            return Err(DecodeError::EdgeOrder {
                index: offset + i + 1,
                expected: Level::High,
            });
        }
        if high.duration > HIGH_MAX {
            return Err(DecodeError::PulseWidth {
                index: offset + i + 1,
                width: high.duration,
            });
        }

        byte <<= 1;
        if high.duration > HIGH_AVG {
            byte |= 1;
        }
    }
    Ok(byte)
}

/// Low byte of the sum of the four data bytes.
pub fn checksum(bytes: &[u8; 5]) -> u8 {
    bytes[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

fn reconstruct(family: SensorFamily, b: &[u8; 5]) -> Reading {
    match family {
        SensorFamily::Dht11 => Reading {
            humidity: f64::from(b[0]),
            temperature: f64::from(b[2]),
        },
        SensorFamily::Dht22 => {
            let humidity = f64::from((u16::from(b[0]) << 8) | u16::from(b[1])) / 10.0;
            let magnitude = f64::from((u16::from(b[2] & 0x7F) << 8) | u16::from(b[3])) / 10.0;
            let temperature = if b[2] & 0x80 != 0 {
                -magnitude
            } else {
                magnitude
            };
            Reading {
                temperature,
                humidity,
            }
        }
    }
}

// ── Frame synthesis ──────────────────────────────────────────

/// Encode a reading into the 5-byte frame the given family would send.
///
/// Values are rounded to the family's resolution and clamped to what the
/// frame can carry.  The checksum byte is filled in.
pub fn encode(family: SensorFamily, reading: Reading) -> [u8; 5] {
    let mut b = [0u8; 5];
    match family {
        SensorFamily::Dht11 => {
            b[0] = reading.humidity.round().clamp(0.0, 255.0) as u8;
            b[2] = reading.temperature.round().clamp(0.0, 255.0) as u8;
        }
        SensorFamily::Dht22 => {
            let h = (reading.humidity * 10.0).round().clamp(0.0, 65535.0) as u16;
            let t = (reading.temperature.abs() * 10.0).round().clamp(0.0, 32767.0) as u16;
            b[0] = (h >> 8) as u8;
            b[1] = h as u8;
            b[2] = (t >> 8) as u8;
            b[3] = t as u8;
            if reading.temperature < 0.0 && t != 0 {
                b[2] |= 0x80;
            }
        }
    }
    b[4] = checksum(&b);
    b
}

/// Build the pulse train a sensor would emit for `frame`.
///
/// `lead_in` handshake pulses (clamped to 0–3) precede the 80 data pulses
/// and two trailing pulses follow them, so the result is always a valid
/// capture length.  The checksum byte is sent as given.
pub fn synthesize(frame: [u8; 5], lead_in: usize) -> PulseTrain {
    let mut train = PulseTrain::new();
    // Capacity (128) exceeds the longest train built here (85).
    for i in 0..lead_in.min(MAX_CAPTURE - MIN_CAPTURE) {
        let p = if i % 2 == 0 {
            Pulse::high(SYNTH_HANDSHAKE_US)
        } else {
            Pulse::low(SYNTH_HANDSHAKE_US)
        };
        let _ = train.push(p);
    }
    for byte in frame {
        for bit in (0..8).rev() {
            let width = if (byte >> bit) & 1 == 1 {
                SYNTH_ONE_US
            } else {
                SYNTH_ZERO_US
            };
            let _ = train.push(Pulse::low(SYNTH_LOW_US));
            let _ = train.push(Pulse::high(width));
        }
    }
    let _ = train.push(Pulse::low(SYNTH_LOW_US));
    let _ = train.push(Pulse::high(SYNTH_HANDSHAKE_US));
    train
}

// ── Driver ───────────────────────────────────────────────────

/// A DHTxx sensor: one capture plus one decode per attempt.
pub struct Dht<C> {
    capture: C,
    family: SensorFamily,
}

impl<C: PulseCapture> Dht<C> {
    pub fn new(capture: C, family: SensorFamily) -> Self {
        Self { capture, family }
    }
}

impl<C: PulseCapture> ReadOnce for Dht<C> {
    fn read_once(&mut self) -> Result<Reading, SensorError> {
        let train = self.capture.capture()?;
        let reading = decode(self.family, &train)?;
        debug!(
            "{:?}: {} pulses -> {:.1}C {:.1}%",
            self.family,
            train.len(),
            reading.temperature,
            reading.humidity
        );
        Ok(reading)
    }
}
