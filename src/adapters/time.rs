//! Host time adapter.
//!
//! Implements [`Clock`] with `std::time::Instant` and `thread::sleep`.
//! Tests substitute a fake clock so retry cooldowns and the minimum
//! sampling interval run instantly.

use core::time::Duration;
use std::time::Instant;

use crate::app::ports::Clock;

/// Monotonic system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
