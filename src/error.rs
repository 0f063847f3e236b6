//! Unified error types for the monitor.
//!
//! One enum per subsystem; the binary wraps them in `anyhow` with
//! context. Variants carry only `Copy`
//! data so they can be logged, emitted as events and retained as the
//! "last error" of a retry loop without allocation.

use core::fmt;
use core::time::Duration;
use std::io;

use crate::sensors::Level;

// ---------------------------------------------------------------------------
// Protocol decode errors
// ---------------------------------------------------------------------------

/// Reasons a captured pulse train is rejected by the DHTxx decoder.
///
/// A decode error never carries a partial reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodeError {
    /// The capture did not contain 82–85 pulses.
    MalformedLength(usize),
    /// A bit's pulse pair did not start low and end high.
    EdgeOrder { index: usize, expected: Level },
    /// A high pulse lasted longer than any valid bit encoding.
    PulseWidth { index: usize, width: Duration },
    /// Byte 4 does not equal the low byte of the sum of bytes 0–3.
    Checksum { expected: u8, actual: u8 },
    /// Decoded humidity exceeds 100 %.
    HumidityOutOfRange(f64),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLength(len) => {
                write!(f, "malformed pulse-train length: {len} (expected 82-85)")
            }
            Self::EdgeOrder { index, expected } => {
                write!(f, "edge-order violation: {expected:?} edge expected at index {index}")
            }
            Self::PulseWidth { index, width } => write!(
                f,
                "pulse width out of range: {}us at index {index}",
                width.as_micros()
            ),
            Self::Checksum { expected, actual } => {
                write!(f, "checksum mismatch: got {actual}, bytes sum to {expected}")
            }
            Self::HumidityOutOfRange(h) => {
                write!(f, "humidity out of physical range: {h:.1}%")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorError {
    /// The pulse capture collaborator failed to talk to the line.
    Capture(io::ErrorKind),
    /// The capture succeeded but the pulse train was invalid.
    Decode(DecodeError),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture(kind) => write!(f, "capture failed: {kind}"),
            Self::Decode(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<DecodeError> for SensorError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

impl From<io::Error> for SensorError {
    fn from(e: io::Error) -> Self {
        Self::Capture(e.kind())
    }
}

/// A read whose retry budget ran out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadError {
    /// Error from the final attempt.
    pub last: SensorError,
    /// Number of retries consumed before giving up.
    pub retried: u32,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {} retries)", self.last, self.retried)
    }
}

impl std::error::Error for ReadError {}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying file I/O failed.
    Io(io::ErrorKind),
    /// A stored record could not be parsed.
    Malformed { record: usize, reason: &'static str },
    /// The store was already closed.
    Closed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(kind) => write!(f, "I/O error: {kind}"),
            Self::Malformed { record, reason } => {
                write!(f, "malformed record {record}: {reason}")
            }
            Self::Closed => write!(f, "store closed"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.kind())
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config file at the given path.
    NotFound,
    /// Config file exists but is not valid JSON for `SystemConfig`.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Threat-table bounds are not strictly increasing at `index`.
    UnsortedThresholds { index: usize },
    /// Generic I/O error while reading or writing the file.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::UnsortedThresholds { index } => {
                write!(f, "threat table bound {} is not above its predecessor", index)
            }
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
