//! Mock adapters for integration tests.
//!
//! Records every pin write, event and stored record so tests can assert
//! on the full history without touching GPIO or the filesystem.

use core::convert::Infallible;
use core::time::Duration;
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Instant;

use embedded_hal::digital::{ErrorType, OutputPin};
use pimon::app::events::AppEvent;
use pimon::app::ports::{Clock, EventSink, PulseCapture, ReadOnce, RecordStore};
use pimon::error::{SensorError, StoreError};
use pimon::measurement::Measurement;
use pimon::sensors::{PulseTrain, Reading};
use pimon::shutdown::Shutdown;

// ── RecordingPin ─────────────────────────────────────────────

/// One pin write: which thread made it and the level written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    pub thread: ThreadId,
    pub high: bool,
}

#[derive(Clone, Default)]
pub struct RecordingPin {
    writes: Arc<Mutex<Vec<PinWrite>>>,
}

#[allow(dead_code)]
impl RecordingPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<PinWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn is_high(&self) -> bool {
        self.writes.lock().unwrap().last().is_some_and(|w| w.high)
    }

    fn push(&self, high: bool) {
        self.writes.lock().unwrap().push(PinWrite {
            thread: thread::current().id(),
            high,
        });
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.push(true);
        Ok(())
    }
}

// ── FakeClock ────────────────────────────────────────────────

/// Clock whose sleeps advance time instantly.  Clones share the offset.
#[derive(Clone)]
pub struct FakeClock {
    base: Instant,
    elapsed: Rc<Cell<Duration>>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
    }
}

// ── ScriptedSensor ───────────────────────────────────────────

/// Replays a fixed list of outcomes, then requests shutdown and keeps
/// failing.
pub struct ScriptedSensor {
    outcomes: VecDeque<Result<Reading, SensorError>>,
    shutdown: Shutdown,
    pub attempts: usize,
}

#[allow(dead_code)]
impl ScriptedSensor {
    pub fn new(outcomes: Vec<Result<Reading, SensorError>>, shutdown: Shutdown) -> Self {
        Self {
            outcomes: outcomes.into(),
            shutdown,
            attempts: 0,
        }
    }
}

impl ReadOnce for ScriptedSensor {
    fn read_once(&mut self) -> Result<Reading, SensorError> {
        self.attempts += 1;
        let next = self.outcomes.pop_front();
        if self.outcomes.is_empty() {
            self.shutdown.request();
        }
        next.unwrap_or(Err(SensorError::Capture(std::io::ErrorKind::TimedOut)))
    }
}

// ── ScriptedCapture ──────────────────────────────────────────

/// Replays pulse trains, then requests shutdown.
pub struct ScriptedCapture {
    trains: VecDeque<PulseTrain>,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl ScriptedCapture {
    pub fn new(trains: Vec<PulseTrain>, shutdown: Shutdown) -> Self {
        Self {
            trains: trains.into(),
            shutdown,
        }
    }
}

impl PulseCapture for ScriptedCapture {
    fn capture(&mut self) -> Result<PulseTrain, SensorError> {
        let next = self.trains.pop_front();
        if self.trains.is_empty() {
            self.shutdown.request();
        }
        Ok(next.unwrap_or_default())
    }
}

// ── MemStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MemShared {
    pub records: Vec<Measurement>,
    pub closes: usize,
    pub fail_appends: bool,
}

/// In-memory record store; clones share the same records.
#[derive(Clone, Default)]
pub struct MemStore {
    pub shared: Arc<Mutex<MemShared>>,
}

#[allow(dead_code)]
impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Measurement>) -> Self {
        let store = Self::new();
        store.shared.lock().unwrap().records = records;
        store
    }

    pub fn records(&self) -> Vec<Measurement> {
        self.shared.lock().unwrap().records.clone()
    }

    pub fn closes(&self) -> usize {
        self.shared.lock().unwrap().closes
    }

    pub fn fail_appends(&self) {
        self.shared.lock().unwrap().fail_appends = true;
    }
}

impl RecordStore for MemStore {
    fn load_all(&mut self) -> Result<Vec<Measurement>, StoreError> {
        Ok(self.records())
    }

    fn append(&mut self, measurement: &Measurement) -> Result<(), StoreError> {
        let mut s = self.shared.lock().unwrap();
        if s.fail_appends {
            return Err(StoreError::Io(std::io::ErrorKind::StorageFull));
        }
        s.records.push(*measurement);
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.shared.lock().unwrap().closes += 1;
        Ok(())
    }
}

// ── RecordingSink ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Helpers ──────────────────────────────────────────────────

#[allow(dead_code)]
pub fn reading(temperature: f64, humidity: f64) -> Reading {
    Reading {
        temperature,
        humidity,
    }
}

#[allow(dead_code)]
pub fn at(secs: i64, temperature: f64, humidity: f64) -> Measurement {
    Measurement::from_unix(secs, temperature, humidity).unwrap()
}
