//! piled: blink a pattern on a GPIO LED until interrupted.
//!
//! ```text
//! piled <gpio> [preset | step...]
//!
//!   piled 27                   heartbeat1000
//!   piled 27 fastblink
//!   piled 27 50ms 250ms 50ms 1s
//! ```
//!
//! Handy for checking the warning LED wiring before running the monitor.
//! The first SIGINT/SIGTERM switches the LED off and exits; a second one
//! exits at once.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pimon::adapters::gpio::SysfsOutputPin;
use pimon::drivers::led_patterns::{Pattern, PatternTable};
use pimon::drivers::warning_led::PatternActuator;
use pimon::shutdown::Shutdown;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "piled=info,pimon=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((line, words)) = args.split_first() else {
        bail!("usage: piled <gpio> [preset | step...]; name the GPIO line the LED is on");
    };
    let line: u32 = line
        .parse()
        .with_context(|| format!("{line:?} is not a GPIO line number"))?;
    let pattern = Pattern::parse_args(words).context("parsing blink pattern")?;

    let shutdown = Shutdown::install().context("installing signal handler")?;
    let pin = SysfsOutputPin::new(line).with_context(|| format!("opening LED on GPIO{line}"))?;
    let mut led = PatternActuator::new(pin, PatternTable::default());

    info!(
        "Blinking {:?} on GPIO{} until interrupted",
        pattern.steps(),
        line
    );
    led.play(pattern);
    if !led.is_blinking() {
        bail!("blink thread could not be started");
    }
    while !shutdown.requested() {
        thread::sleep(SHUTDOWN_POLL);
    }

    led.stop();
    info!("LED off, bye");
    Ok(())
}
