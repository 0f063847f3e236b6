//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade.  The binary routes those records to stderr
//! via `tracing-subscriber`.

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { belief } => match belief {
                Some(b) => info!("START | belief={}", b),
                None => info!("START | no history"),
            },
            AppEvent::Measured {
                raw,
                belief,
                level,
                retried,
            } => {
                info!(
                    "MEAS | {} | belief {:.1}C {:.1}% | danger={} | retries={}",
                    raw, belief.temperature, belief.humidity, level, retried
                );
            }
            AppEvent::Conserved => debug!("MEAS | unchanged, not recorded"),
            AppEvent::RiskChanged { from, to } => {
                info!("RISK | {} -> {}", from, to);
            }
            AppEvent::ReadFailed(e) => {
                error!("READ | {}", e);
            }
            AppEvent::PersistFailed(e) => {
                warn!("STORE | {}", e);
            }
            AppEvent::Stopped { records } => {
                info!("STOP | {} records", records);
            }
        }
    }
}
