//! Warning LED actuator against a recording pin.
//!
//! Blink steps are long (seconds) so the blink thread writes exactly once
//! (the initial "on") before each test cancels it.

use core::time::Duration;
use std::thread;

use pimon::app::ports::IndicatorPort;
use pimon::app::risk::RiskLevel;
use pimon::drivers::led_patterns::{Pattern, PatternTable};
use pimon::drivers::warning_led::PatternActuator;

use crate::mock_hw::RecordingPin;

fn slow_patterns() -> PatternTable {
    let slow = Pattern::from_millis(&[10_000, 10_000]);
    PatternTable {
        low: Pattern::off(),
        moderate: slow.clone(),
        elevated: slow.clone(),
        high: slow.clone(),
        severe: slow.clone(),
        extreme: slow,
    }
}

/// Wait until the blink thread has made its first write.
fn settle(pin: &RecordingPin, writes: usize) {
    for _ in 0..200 {
        if pin.count() >= writes {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("expected {writes} pin writes, saw {}", pin.count());
}

#[test]
fn repeated_level_is_a_no_op() {
    let pin = RecordingPin::new();
    let mut led = PatternActuator::new(pin.clone(), slow_patterns());
    assert_eq!(pin.count(), 1); // forced low at construction

    led.update(RiskLevel::High);
    settle(&pin, 3);
    let before = pin.count();

    led.update(RiskLevel::High);
    led.update(RiskLevel::High);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(pin.count(), before);
    assert!(led.is_blinking());

    led.stop();
}

#[test]
fn level_change_never_overlaps_blink_threads() {
    let pin = RecordingPin::new();
    let mut led = PatternActuator::new(pin.clone(), slow_patterns());
    let main = thread::current().id();

    let mut expected = 1;
    for level in [RiskLevel::Moderate, RiskLevel::Severe, RiskLevel::Elevated] {
        led.update(level);
        // halt's set_low on the caller, then the new thread's set_high.
        expected += 2;
        settle(&pin, expected);
    }
    led.stop();

    let writes = pin.writes();
    // Each blink thread's writes form one contiguous run bracketed by
    // writes from the controlling thread.
    let mut seen = Vec::new();
    let mut prev = main;
    for w in &writes {
        if w.thread != prev && w.thread != main {
            assert!(!seen.contains(&w.thread), "blink thread resumed after being replaced");
            seen.push(w.thread);
        }
        prev = w.thread;
    }
    assert_eq!(seen.len(), 3);
    assert!(!writes.last().unwrap().high);
    assert_eq!(writes.last().unwrap().thread, main);
}

#[test]
fn stop_when_idle_forces_off() {
    let pin = RecordingPin::new();
    let mut led = PatternActuator::new(pin.clone(), slow_patterns());
    led.stop();
    led.stop();
    assert!(!pin.is_high());
    assert_eq!(led.level(), RiskLevel::Low);
    assert!(!led.is_blinking());
}

#[test]
fn non_blinking_level_turns_led_off() {
    let pin = RecordingPin::new();
    let mut led = PatternActuator::new(pin.clone(), slow_patterns());
    led.update(RiskLevel::Extreme);
    settle(&pin, 3);
    assert!(pin.is_high());

    led.update(RiskLevel::Low);
    assert!(!led.is_blinking());
    assert!(!pin.is_high());
}

#[test]
fn fast_pattern_toggles_and_stops_cleanly() {
    let pin = RecordingPin::new();
    let mut led = PatternActuator::new(pin.clone(), PatternTable::default());
    IndicatorPort::update(&mut led, RiskLevel::Extreme); // 50ms on / 50ms off
    settle(&pin, 6);
    IndicatorPort::stop(&mut led);

    let writes = pin.writes();
    assert!(!writes.last().unwrap().high);
    // After construction, the blink thread alternates starting with on.
    let blink: Vec<bool> = writes[2..writes.len() - 1].iter().map(|w| w.high).collect();
    for pair in blink.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
    assert!(writes[2].high);
}

#[test]
fn pin_comes_back_after_blinking() {
    let pin = RecordingPin::new();
    let mut led = PatternActuator::new(pin.clone(), slow_patterns());
    led.update(RiskLevel::Moderate);
    settle(&pin, 3);
    led.stop();
    assert!(!led.is_blinking());
    assert!(!pin.is_high());

    // The joined thread handed the pin back, so blinking can resume.
    led.update(RiskLevel::Moderate);
    assert!(led.is_blinking());
    led.stop();
}
