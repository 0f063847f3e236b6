//! Application service: the hexagonal core.
//!
//! [`AppService`] wires one sampling cycle together.  It owns the risk
//! table and the indicator and shares the [`Monitor`] with the status
//! server.  All I/O flows through port traits, making the whole service
//! testable with mock adapters.
//!
//! ```text
//!  MinIntervalGate ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                      │         AppService          │
//!   IndicatorPort ◀──  │ Monitor · ThreatTable       │
//!                      └─────────────────────────────┘
//! ```

use std::sync::Arc;

use log::{error, info, warn};

use super::events::AppEvent;
use super::monitor::Monitor;
use super::ports::{Clock, EventSink, IndicatorPort, ReadOnce};
use super::risk::{RiskLevel, ThreatTable};
use crate::measurement::Measurement;
use crate::sensors::Reading;
use crate::sensors::reader::MinIntervalGate;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService<I> {
    monitor: Arc<Monitor>,
    table: ThreatTable,
    indicator: I,
    level: RiskLevel,
    cycles: u64,
}

impl<I: IndicatorPort> AppService<I> {
    /// The indicator is assumed to start at [`RiskLevel::Low`].
    pub fn new(monitor: Arc<Monitor>, table: ThreatTable, indicator: I) -> Self {
        Self {
            monitor,
            table,
            indicator,
            level: RiskLevel::Low,
            cycles: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let belief = self.monitor.belief();
        sink.emit(&AppEvent::Started { belief });
        info!(
            "AppService started ({} records, belief={})",
            self.monitor.len(),
            belief.map_or_else(|| "none".into(), |b| b.to_string())
        );
    }

    /// Sample until `stop` reports true.
    pub fn run<S: ReadOnce, K: Clock>(
        &mut self,
        gate: &mut MinIntervalGate<S, K>,
        stop: impl Fn() -> bool,
        sink: &mut impl EventSink,
    ) {
        loop {
            let next = gate.next(&stop, |e| sink.emit(&AppEvent::ReadFailed(*e)));
            let Some((reading, retried)) = next else {
                break;
            };
            self.handle_reading(reading, retried, sink);
        }
        info!("Sampling loop stopped after {} cycles", self.cycles);
    }

    /// Close the monitor, then switch the indicator off.
    pub fn shutdown(&mut self, sink: &mut impl EventSink) {
        if let Err(e) = self.monitor.close() {
            error!("Closing measurement store failed: {}", e);
            sink.emit(&AppEvent::PersistFailed(e));
        }
        self.indicator.stop();
        self.level = RiskLevel::Low;
        sink.emit(&AppEvent::Stopped {
            records: self.monitor.len(),
        });
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Stamp a fresh reading with the current time and process it.
    fn handle_reading(
        &mut self,
        reading: Reading,
        retried: u32,
        sink: &mut impl EventSink,
    ) -> RiskLevel {
        self.record(Measurement::now(reading), retried, sink)
    }

    /// One cycle: monitor update → classify the raw humidity → indicator.
    pub fn record(
        &mut self,
        raw: Measurement,
        retried: u32,
        sink: &mut impl EventSink,
    ) -> RiskLevel {
        self.cycles += 1;

        match self.monitor.update(raw) {
            Ok(true) => {}
            Ok(false) => sink.emit(&AppEvent::Conserved),
            Err(e) => {
                warn!("Persisting measurement failed: {}", e);
                sink.emit(&AppEvent::PersistFailed(e));
            }
        }

        let level = self.table.classify(raw.humidity);
        if level != self.level {
            sink.emit(&AppEvent::RiskChanged {
                from: self.level,
                to: level,
            });
            self.level = level;
        }
        self.indicator.update(level);

        let belief = self.monitor.belief().unwrap_or(raw);
        sink.emit(&AppEvent::Measured {
            raw,
            belief,
            level,
            retried,
        });
        level
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn level(&self) -> RiskLevel {
        self.level
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn monitor(&self) -> &Arc<Monitor> {
        &self.monitor
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }
}
