//! Warning LED: a restartable, cancellable blink scheduler.
//!
//! ```text
//!              update(level ≠ current)
//!   ┌──────┐ ─────────────────────────▶ ┌──────────┐
//!   │ Idle │        (pattern blinks)    │ Blinking │
//!   │ pin  │ ◀───────────────────────── │  thread  │
//!   └──────┘   stop(): signal + join    └──────────┘
//! ```
//!
//! The pin is moved into the blink thread while it runs and handed back
//! when the thread is joined, so at most one thread can ever drive it.
//! `stop` does not return until the thread has exited.
//!
//! The blink thread drives a single future with `futures_lite` and races
//! each `async_io_mini` timer against an `embassy_sync` cancel signal.

use core::mem;
use std::sync::Arc;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal::digital::OutputPin;
use log::{error, info};

use super::led_patterns::{Pattern, PatternTable};
use super::task::spawn_named;
use crate::app::ports::IndicatorPort;
use crate::app::risk::RiskLevel;

const BLINK_STACK_KB: usize = 64;

type CancelSignal = Signal<CriticalSectionRawMutex, ()>;

enum Blink<P> {
    Idle(P),
    Running {
        cancel: Arc<CancelSignal>,
        handle: JoinHandle<P>,
    },
    /// The blink thread panicked or could not be spawned; the pin is gone.
    Lost,
}

pub struct PatternActuator<P: OutputPin> {
    state: Blink<P>,
    level: RiskLevel,
    patterns: PatternTable,
}

impl<P: OutputPin + Send + 'static> PatternActuator<P> {
    /// Take ownership of `pin`, switch it off and start in the Low level.
    pub fn new(mut pin: P, patterns: PatternTable) -> Self {
        pin.set_low().ok();
        Self {
            state: Blink::Idle(pin),
            level: RiskLevel::Low,
            patterns,
        }
    }

    pub fn level(&self) -> RiskLevel {
        self.level
    }

    pub fn is_blinking(&self) -> bool {
        matches!(self.state, Blink::Running { .. })
    }

    /// Show `level`; does nothing if it is already shown.
    pub fn update(&mut self, level: RiskLevel) {
        if level == self.level {
            return;
        }
        self.level = level;

        let pattern = self.patterns.get(level).clone();
        if pattern.blinks() {
            info!("Warning LED: {} (cycle {:?})", level, pattern.period());
        } else {
            info!("Warning LED: {} (off)", level);
        }
        self.play(pattern);
    }

    /// Replace whatever is showing with `pattern`, leaving the level as is.
    /// A pattern that does not blink leaves the LED off.
    pub fn play(&mut self, pattern: Pattern) {
        self.halt();
        if pattern.blinks() {
            self.start(pattern);
        }
    }

    /// Stop blinking and leave the LED off.  Safe to call when idle.
    pub fn stop(&mut self) {
        self.halt();
        self.level = RiskLevel::Low;
    }

    fn start(&mut self, pattern: Pattern) {
        let Blink::Idle(pin) = mem::replace(&mut self.state, Blink::Lost) else {
            error!("Warning LED: pin unavailable, not blinking");
            return;
        };

        let cancel = Arc::new(CancelSignal::new());
        let task_cancel = Arc::clone(&cancel);
        match spawn_named("warning-led", BLINK_STACK_KB, move || {
            blink(pin, &pattern, &task_cancel)
        }) {
            Ok(handle) => self.state = Blink::Running { cancel, handle },
            Err(e) => error!("Warning LED: blink thread spawn failed: {}", e),
        }
    }

    /// Cancel and join the blink thread if any, then force the pin low.
    fn halt(&mut self) {
        self.state = match mem::replace(&mut self.state, Blink::Lost) {
            Blink::Idle(mut pin) => {
                pin.set_low().ok();
                Blink::Idle(pin)
            }
            Blink::Running { cancel, handle } => {
                cancel.signal(());
                match handle.join() {
                    Ok(mut pin) => {
                        pin.set_low().ok();
                        Blink::Idle(pin)
                    }
                    Err(_) => {
                        error!("Warning LED: blink thread panicked, LED state unknown");
                        Blink::Lost
                    }
                }
            }
            Blink::Lost => Blink::Lost,
        };
    }
}

impl<P: OutputPin + Send + 'static> IndicatorPort for PatternActuator<P> {
    fn update(&mut self, level: RiskLevel) {
        PatternActuator::update(self, level);
    }

    fn stop(&mut self) {
        PatternActuator::stop(self);
    }
}

impl<P: OutputPin> Drop for PatternActuator<P> {
    fn drop(&mut self) {
        if let Blink::Running { cancel, handle } = mem::replace(&mut self.state, Blink::Lost) {
            cancel.signal(());
            if let Ok(mut pin) = handle.join() {
                pin.set_low().ok();
            }
        }
    }
}

/// Blink thread body: on, then toggle after each step, until cancelled.
fn blink<P: OutputPin>(mut pin: P, pattern: &Pattern, cancel: &CancelSignal) -> P {
    futures_lite::future::block_on(async {
        let mut high = true;
        pin.set_high().ok();
        loop {
            for &step in pattern.steps() {
                let cancelled = futures_lite::future::or(
                    async {
                        async_io_mini::Timer::after(step).await;
                        false
                    },
                    async {
                        cancel.wait().await;
                        true
                    },
                )
                .await;
                if cancelled {
                    return;
                }
                high = !high;
                if high {
                    pin.set_high().ok();
                } else {
                    pin.set_low().ok();
                }
            }
        }
    });
    pin
}
