//! pimon: humidity monitor entry point.
//!
//! Hexagonal layout: the sampling loop and risk logic live in
//! [`AppService`]; everything that touches the host sits in an adapter.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SysfsPulseCapture  SysfsOutputPin  CsvStore / BinaryStore     │
//! │  SimulatedCapture   SimulatedPin    FileConfig  LogEventSink   │
//! │  SystemClock        StatusServer                               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Dht ─▶ RetryingReader ─▶ MinIntervalGate              │    │
//! │  │               AppService ─▶ Monitor · ThreatTable      │    │
//! │  │                          ─▶ PatternActuator            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shutdown order on SIGINT/SIGTERM: sampling loop, status server,
//! monitor (log closed), warning LED.

use std::sync::Arc;

use anyhow::{Context, Result};
use embedded_hal::digital::OutputPin;
use log::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pimon::adapters::binary_store::BinaryStore;
use pimon::adapters::config_file::FileConfig;
use pimon::adapters::csv_store::CsvStore;
use pimon::adapters::gpio::{SysfsOutputPin, SysfsPulseCapture};
use pimon::adapters::log_sink::LogEventSink;
use pimon::adapters::sim::{SimulatedCapture, SimulatedPin};
use pimon::adapters::status::StatusServer;
use pimon::adapters::time::SystemClock;
use pimon::app::monitor::{Monitor, SharedStore};
use pimon::app::ports::{ConfigPort, PulseCapture};
use pimon::app::service::AppService;
use pimon::config::{SensorBackend, StoreKind, SystemConfig};
use pimon::drivers::warning_led::PatternActuator;
use pimon::error::ConfigError;
use pimon::sensors::dht::Dht;
use pimon::sensors::reader::{MinIntervalGate, RetryingReader};
use pimon::shutdown::Shutdown;

/// `RUST_LOG` overrides the default filter.  `log` records from the
/// library reach the subscriber through its `tracing-log` bridge.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pimon=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// First CLI argument, else `$PIMON_CONFIG`, else defaults.  A named file
/// that does not exist also falls back to defaults.
fn load_config() -> Result<SystemConfig> {
    let Some(file) = FileConfig::from_args_or_env(std::env::args().nth(1)) else {
        info!("No config file given, using defaults");
        return Ok(SystemConfig::default());
    };
    match file.load() {
        Ok(cfg) => Ok(cfg),
        Err(ConfigError::NotFound) => {
            warn!("{} not found, using defaults", file.path().display());
            Ok(SystemConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("loading {}", file.path().display())),
    }
}

fn open_store(cfg: &SystemConfig) -> Result<Option<SharedStore>> {
    let store: Option<SharedStore> = match cfg.store {
        StoreKind::Csv => Some(Box::new(
            CsvStore::open(&cfg.store_path).context("opening CSV log")?,
        )),
        StoreKind::Binary => Some(Box::new(
            BinaryStore::open(&cfg.store_path).context("opening binary log")?,
        )),
        StoreKind::None => None,
    };
    Ok(store)
}

/// Build the pipeline around `capture` and `pin`, sample until shutdown is
/// requested, then tear down in order.
fn run<C, P>(
    cfg: &SystemConfig,
    capture: C,
    pin: P,
    monitor: Arc<Monitor>,
    status: Option<StatusServer>,
    shutdown: &Shutdown,
) -> Result<()>
where
    C: PulseCapture,
    P: OutputPin + Send + 'static,
{
    let sensor = Dht::new(capture, cfg.sensor_family);
    let reader = RetryingReader::new(sensor, SystemClock, cfg.retry_policy());
    let mut gate = MinIntervalGate::new(reader, cfg.min_interval());

    let table = cfg.threat_table().context("building threat table")?;
    let actuator = PatternActuator::new(pin, cfg.patterns.clone());
    let mut app = AppService::new(monitor, table, actuator);
    let mut sink = LogEventSink::new();

    app.start(&mut sink);
    app.run(&mut gate, || shutdown.requested(), &mut sink);

    if let Some(server) = status {
        server.stop();
    }
    app.shutdown(&mut sink);
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    info!("pimon {} starting", env!("CARGO_PKG_VERSION"));

    let cfg = load_config()?;
    cfg.validate().context("invalid configuration")?;

    let shutdown = Shutdown::install().context("installing signal handler")?;

    let monitor = Arc::new(
        Monitor::new(open_store(&cfg)?, cfg.lag, cfg.conserve).context("loading measurement log")?,
    );
    info!("Loaded {} records", monitor.len());

    let status = match cfg.status_addr()? {
        Some(addr) => Some(
            StatusServer::spawn(addr, monitor.clone())
                .with_context(|| format!("starting status endpoint on {addr}"))?,
        ),
        None => None,
    };

    match cfg.sensor_backend {
        SensorBackend::Simulated => {
            info!("Using simulated {:?} sensor", cfg.sensor_family);
            let capture = SimulatedCapture::new(cfg.sensor_family, rand::random())
                .with_corruption(cfg.sim_corruption);
            run(&cfg, capture, SimulatedPin::default(), monitor, status, &shutdown)
        }
        SensorBackend::Sysfs => {
            let capture = SysfsPulseCapture::new(cfg.sensor_gpio, cfg.sensor_family)
                .with_context(|| format!("opening sensor on GPIO{}", cfg.sensor_gpio))?;
            let pin = SysfsOutputPin::new(cfg.led_gpio)
                .with_context(|| format!("opening warning LED on GPIO{}", cfg.led_gpio))?;
            run(&cfg, capture, pin, monitor, status, &shutdown)
        }
    }?;

    info!("pimon stopped");
    Ok(())
}
