//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them, for example log or count them.

use crate::error::{ReadError, StoreError};
use crate::measurement::Measurement;

use super::risk::RiskLevel;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The sampling loop has started.
    Started { belief: Option<Measurement> },

    /// One sampling cycle completed.
    Measured {
        raw: Measurement,
        belief: Measurement,
        level: RiskLevel,
        retried: u32,
    },

    /// The sample matched the previous record and was not stored.
    Conserved,

    /// The risk level shown on the indicator changed.
    RiskChanged { from: RiskLevel, to: RiskLevel },

    /// A full retry budget was spent without a valid reading.
    ReadFailed(ReadError),

    /// The sample is in memory but could not be written to the store.
    PersistFailed(StoreError),

    /// The sampling loop has exited and teardown finished.
    Stopped { records: usize },
}
