//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (pulse capture, clocks, record stores, the warning
//! indicator, event sinks) implement these traits.  The
//! [`AppService`](super::service::AppService) and the sensor read policies
//! consume them via generics, so the domain core never touches GPIO or the
//! filesystem directly.

use core::time::Duration;
use std::time::Instant;

use crate::app::risk::RiskLevel;
use crate::config::SystemConfig;
use crate::error::{ConfigError, SensorError, StoreError};
use crate::measurement::Measurement;
use crate::sensors::{PulseTrain, Reading};

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Activates the sensor and records the edges it sends back.
///
/// Pulses must be returned in emission order with at least microsecond
/// duration resolution.
pub trait PulseCapture {
    fn capture(&mut self) -> Result<PulseTrain, SensorError>;
}

/// One complete read attempt: capture plus decode.
///
/// The retry policy wraps this, so an implementation must not retry
/// internally.
pub trait ReadOnce {
    fn read_once(&mut self) -> Result<Reading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time and blocking sleep, injected so retry and rate-limit
/// policies can be driven by a fake clock in tests.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → warning output)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the risk indicator.
pub trait IndicatorPort {
    /// Show `level`.  Repeating the current level must be a no-op.
    fn update(&mut self, level: RiskLevel);

    /// Stop any activity and leave the output off.
    fn stop(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Record store port (driven adapter: domain ↔ measurement log)
// ───────────────────────────────────────────────────────────────

/// Append-only measurement log.
///
/// Records are `(timestamp, temperature, humidity)` tuples; the encoding
/// is a policy of the implementation.
pub trait RecordStore {
    /// Every record currently in the log, oldest first.
    fn load_all(&mut self) -> Result<Vec<Measurement>, StoreError>;

    /// Append one record.  Fails with [`StoreError::Closed`] after `close`.
    fn append(&mut self, measurement: &Measurement) -> Result<(), StoreError>;

    /// Flush and release the underlying file.  A second call is a no-op.
    fn close(&mut self) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`ConfigError::NotFound`] if no stored
    /// config exists; the caller decides whether to fall back to defaults.
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}
