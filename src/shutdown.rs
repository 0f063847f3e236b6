//! Two-stage shutdown on SIGINT / SIGTERM.
//!
//! The first signal raises a flag the sampling loop polls, so the monitor
//! closes its log and the LED is switched off.  A second signal exits at
//! once with status 1.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, warn};

#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    /// A flag with no signal handler attached (tests, embedding).
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the process-wide handler.  Only one handler may be
    /// installed per process.
    pub fn install() -> Result<Self, ctrlc::Error> {
        let shutdown = Self::new();
        let flag = shutdown.requested.clone();
        ctrlc::set_handler(move || {
            if flag.swap(true, Ordering::AcqRel) {
                error!("Second signal received, forcing exit");
                std::process::exit(1);
            }
            warn!("Signal received, shutting down (repeat to force)");
        })?;
        Ok(shutdown)
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
