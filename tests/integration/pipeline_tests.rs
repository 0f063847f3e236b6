//! End-to-end sampling pipeline: pulse trains → decoder → retry/gate →
//! AppService → Monitor + warning LED.

use core::time::Duration;
use std::sync::Arc;

use pimon::app::events::AppEvent;
use pimon::app::monitor::Monitor;
use pimon::app::risk::{RiskLevel, ThreatTable};
use pimon::app::service::AppService;
use pimon::drivers::led_patterns::PatternTable;
use pimon::drivers::warning_led::PatternActuator;
use pimon::sensors::dht::{Dht, encode, synthesize};
use pimon::sensors::reader::{MinIntervalGate, RetryPolicy, RetryingReader};
use pimon::sensors::{PulseTrain, SensorFamily};
use pimon::shutdown::Shutdown;

use crate::mock_hw::{
    FakeClock, MemStore, RecordingPin, RecordingSink, ScriptedCapture, ScriptedSensor, reading,
};

fn frame(t: f64, h: f64, lead_in: usize) -> PulseTrain {
    synthesize(encode(SensorFamily::Dht22, reading(t, h)), lead_in)
}

fn policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        cooldown: Duration::from_millis(1500),
    }
}

#[test]
fn frames_flow_into_log_and_led() {
    let shutdown = Shutdown::new();
    let mut bad_checksum = encode(SensorFamily::Dht22, reading(21.0, 30.0));
    bad_checksum[4] ^= 0x01;

    let capture = ScriptedCapture::new(
        vec![
            frame(21.0, 48.0, 0),
            synthesize(bad_checksum, 2),
            frame(21.5, 30.0, 3),
            frame(22.0, 95.0, 1),
        ],
        shutdown.clone(),
    );
    let clock = FakeClock::new();
    let reader = RetryingReader::new(Dht::new(capture, SensorFamily::Dht22), clock.clone(), policy(3));
    let mut gate = MinIntervalGate::new(reader, Duration::from_secs(2));

    let store = MemStore::new();
    let monitor = Arc::new(Monitor::new(Some(Box::new(store.clone())), 0.1, true).unwrap());
    let pin = RecordingPin::new();
    let actuator = PatternActuator::new(pin.clone(), PatternTable::default());
    let mut app = AppService::new(monitor.clone(), ThreatTable::larrivee(), actuator);
    let mut sink = RecordingSink::new();

    app.start(&mut sink);
    app.run(&mut gate, || shutdown.requested(), &mut sink);

    let humidities: Vec<f64> = store.records().iter().map(|m| m.humidity).collect();
    assert_eq!(humidities, vec![48.0, 30.0, 95.0]);

    let retries: Vec<u32> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Measured { retried, .. } => Some(*retried),
            _ => None,
        })
        .collect();
    assert_eq!(retries, vec![0, 1, 0]);
    assert_eq!(app.level(), RiskLevel::Severe);
    assert!(app.indicator().is_blinking());

    // Two interval waits plus one cooldown after the checksum failure.
    assert_eq!(clock.elapsed(), Duration::from_millis(2000 + 1500 + 2000));

    app.shutdown(&mut sink);
    assert!(!pin.is_high());
    assert_eq!(store.closes(), 1);
    assert!(matches!(sink.events.last(), Some(AppEvent::Stopped { records: 3 })));
}

#[test]
fn exhausted_budget_reports_and_keeps_sampling() {
    use pimon::error::SensorError;
    use std::io::ErrorKind;

    let shutdown = Shutdown::new();
    let fail = || Err(SensorError::Capture(ErrorKind::TimedOut));
    let sensor = ScriptedSensor::new(
        vec![fail(), fail(), fail(), Ok(reading(20.0, 45.0))],
        shutdown.clone(),
    );
    let reader = RetryingReader::new(sensor, FakeClock::new(), policy(1));
    let mut gate = MinIntervalGate::new(reader, Duration::from_secs(2));

    let monitor = Arc::new(Monitor::new(None, 0.1, true).unwrap());
    let actuator = PatternActuator::new(RecordingPin::new(), PatternTable::default());
    let mut app = AppService::new(monitor.clone(), ThreatTable::larrivee(), actuator);
    let mut sink = RecordingSink::new();

    app.run(&mut gate, || shutdown.requested(), &mut sink);

    // Budget of 2 attempts: one full failure, then fail + success.
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ReadFailed(f) if f.retried == 1)), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Measured { retried: 1, .. })),
        1
    );
    assert_eq!(monitor.len(), 1);
    assert_eq!(app.level(), RiskLevel::Low);
}

#[test]
fn conserve_skips_duplicates_but_still_classifies() {
    let shutdown = Shutdown::new();
    let capture = ScriptedCapture::new(
        vec![frame(20.0, 60.0, 0), frame(20.0, 60.0, 0), frame(20.0, 60.0, 2)],
        shutdown.clone(),
    );
    let reader = RetryingReader::new(
        Dht::new(capture, SensorFamily::Dht22),
        FakeClock::new(),
        policy(0),
    );
    let mut gate = MinIntervalGate::new(reader, Duration::from_secs(2));

    let store = MemStore::new();
    let monitor = Arc::new(Monitor::new(Some(Box::new(store.clone())), 0.1, true).unwrap());
    let actuator = PatternActuator::new(RecordingPin::new(), PatternTable::default());
    let mut app = AppService::new(monitor, ThreatTable::larrivee(), actuator);
    let mut sink = RecordingSink::new();

    app.run(&mut gate, || shutdown.requested(), &mut sink);

    assert_eq!(store.records().len(), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Conserved)), 2);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Measured { .. })), 3);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RiskChanged { to: RiskLevel::Moderate, .. })),
        1
    );
    app.shutdown(&mut sink);
}

#[test]
fn persist_failure_is_not_fatal() {
    let shutdown = Shutdown::new();
    let capture = ScriptedCapture::new(
        vec![frame(20.0, 50.0, 0), frame(20.0, 51.0, 0)],
        shutdown.clone(),
    );
    let reader = RetryingReader::new(
        Dht::new(capture, SensorFamily::Dht22),
        FakeClock::new(),
        policy(0),
    );
    let mut gate = MinIntervalGate::new(reader, Duration::from_secs(2));

    let store = MemStore::new();
    store.fail_appends();
    let monitor = Arc::new(Monitor::new(Some(Box::new(store.clone())), 0.1, true).unwrap());
    let actuator = PatternActuator::new(RecordingPin::new(), PatternTable::default());
    let mut app = AppService::new(monitor.clone(), ThreatTable::larrivee(), actuator);
    let mut sink = RecordingSink::new();

    app.run(&mut gate, || shutdown.requested(), &mut sink);

    assert_eq!(sink.count(|e| matches!(e, AppEvent::PersistFailed(_))), 2);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Measured { .. })), 2);
    assert!(store.records().is_empty());
    assert_eq!(monitor.len(), 2);
}

#[test]
fn belief_resumes_from_stored_log() {
    use crate::mock_hw::at;

    let store = MemStore::with_records(vec![at(0, 20.0, 40.0), at(2, 20.0, 50.0)]);
    let monitor = Arc::new(Monitor::new(Some(Box::new(store.clone())), 0.5, true).unwrap());
    let actuator = PatternActuator::new(RecordingPin::new(), PatternTable::default());
    let mut app = AppService::new(monitor.clone(), ThreatTable::larrivee(), actuator);
    let mut sink = RecordingSink::new();

    app.start(&mut sink);
    assert!(matches!(
        sink.events[0],
        AppEvent::Started { belief: Some(b) } if b.humidity == 50.0
    ));

    app.record(at(4, 22.0, 60.0), 0, &mut sink);
    let belief = monitor.belief().unwrap();
    assert!((belief.humidity - 55.0).abs() < 0.001);
    assert!((belief.temperature - 21.0).abs() < 0.001);
    assert_eq!(store.records().len(), 3);
}
