//! Read policies composed around a single sensor attempt.
//!
//! Two independent layers:
//!
//! 1. [`RetryingReader`]: bounded retry with a fixed cooldown between
//!    attempts.  The cooldown also respects the sensor's re-arm time.
//!    Both layers check the caller's stop predicate between attempts and
//!    during every wait.
//! 2. [`MinIntervalGate`]: returns at most one reading per interval and
//!    keeps retrying through exhausted budgets until a reading arrives or
//!    the caller asks it to stop.

use core::time::Duration;
use std::time::Instant;

use log::{debug, warn};

use super::Reading;
use crate::app::ports::{Clock, ReadOnce};
use crate::error::ReadError;

/// Longest uninterrupted sleep, so a stop request is noticed promptly.
const STOP_POLL: Duration = Duration::from_millis(100);

/// Sleep until `due` in short slices.  False if `stop` fired first.
fn wait_until(clock: &impl Clock, due: Instant, stop: &impl Fn() -> bool) -> bool {
    loop {
        if stop() {
            return false;
        }
        let now = clock.now();
        if now >= due {
            return true;
        }
        clock.sleep((due - now).min(STOP_POLL));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 means a single attempt.
    pub max_retries: u32,
    pub cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            cooldown: Duration::from_millis(1500),
        }
    }
}

// ── RetryingReader ───────────────────────────────────────────

pub struct RetryingReader<S, K> {
    sensor: S,
    clock: K,
    policy: RetryPolicy,
}

impl<S: ReadOnce, K: Clock> RetryingReader<S, K> {
    pub fn new(sensor: S, clock: K, policy: RetryPolicy) -> Self {
        Self {
            sensor,
            clock,
            policy,
        }
    }

    /// First successful reading plus the retries it took, or the final
    /// attempt's error once the budget is spent.
    ///
    /// `None` when `stop` fires before an attempt or during a cooldown;
    /// no further attempt is made after that.
    pub fn read(&mut self, stop: impl Fn() -> bool) -> Option<Result<(Reading, u32), ReadError>> {
        let mut retried = 0;
        loop {
            if stop() {
                return None;
            }
            match self.sensor.read_once() {
                Ok(reading) => return Some(Ok((reading, retried))),
                Err(last) if retried >= self.policy.max_retries => {
                    return Some(Err(ReadError { last, retried }));
                }
                Err(e) => {
                    debug!("Sensor attempt {} failed: {}", retried + 1, e);
                    retried += 1;
                    let due = self.clock.now() + self.policy.cooldown;
                    if !wait_until(&self.clock, due, &stop) {
                        return None;
                    }
                }
            }
        }
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }
}

// ── MinIntervalGate ──────────────────────────────────────────

pub struct MinIntervalGate<S, K> {
    reader: RetryingReader<S, K>,
    interval: Duration,
    last_return: Option<Instant>,
}

impl<S: ReadOnce, K: Clock> MinIntervalGate<S, K> {
    pub fn new(reader: RetryingReader<S, K>, interval: Duration) -> Self {
        Self {
            reader,
            interval,
            last_return: None,
        }
    }

    /// Wait out the interval, then read until a reading arrives.
    ///
    /// Each exhausted retry budget is passed to `on_failure` and the gate
    /// starts a fresh one.  Returns `None` as soon as `stop` reports true.
    pub fn next(
        &mut self,
        stop: impl Fn() -> bool,
        mut on_failure: impl FnMut(&ReadError),
    ) -> Option<(Reading, u32)> {
        if let Some(last) = self.last_return {
            if !wait_until(self.reader.clock(), last + self.interval, &stop) {
                return None;
            }
        }

        loop {
            match self.reader.read(&stop)? {
                Ok(result) => {
                    self.last_return = Some(self.reader.clock().now());
                    return Some(result);
                }
                Err(e) => {
                    warn!("Sensor read failed: {}", e);
                    on_failure(&e);
                }
            }
        }
    }
}
