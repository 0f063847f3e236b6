//! System configuration parameters
//!
//! All tunable parameters for the monitor.  Built once at startup (from a
//! JSON file or defaults), validated, and passed by value into the
//! constructors that need it.  Missing fields take their default.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::adapters::sim::DEFAULT_CORRUPTION;
use crate::app::risk::{RiskLevel, ThreatTable, Threshold};
use crate::drivers::led_patterns::PatternTable;
use crate::error::ConfigError;
use crate::pins;
use crate::sensors::SensorFamily;
use crate::sensors::reader::RetryPolicy;

/// Where pulse trains come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorBackend {
    /// Linux sysfs GPIO.
    #[default]
    Sysfs,
    /// Synthesised frames, no hardware needed.
    Simulated,
}

/// Encoding of the measurement log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// One `time,temperature,humidity` line per record.
    #[default]
    Csv,
    /// Length-prefixed postcard records.
    Binary,
    /// Keep measurements in memory only.
    None,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Sensor ---
    pub sensor_family: SensorFamily,
    pub sensor_backend: SensorBackend,
    /// GPIO line the sensor data pin is wired to
    pub sensor_gpio: u32,
    /// Retries after a failed read before the cycle is reported failed
    pub max_retries: u32,
    /// Pause between read attempts (milliseconds)
    pub retry_cooldown_ms: u64,
    /// Minimum time between two measurements (milliseconds)
    pub min_interval_ms: u64,
    /// Share of damaged captures from the simulated backend, in [0, 1]
    pub sim_corruption: f64,

    // --- Monitor ---
    /// Smoothing weight of a new sample, in (0, 1]
    pub lag: f64,
    /// Skip recording samples identical to the previous one
    pub conserve: bool,
    pub store: StoreKind,
    pub store_path: PathBuf,

    // --- Warning LED ---
    /// GPIO line driving the warning LED
    pub led_gpio: u32,
    /// Humidity thresholds, strictly increasing
    pub thresholds: Vec<Threshold>,
    /// Level for humidity at or above the last threshold
    pub terminal_level: RiskLevel,
    pub patterns: PatternTable,

    // --- Status ---
    /// `host:port` or `:port` for the status endpoint; disabled when absent
    pub status_listen: Option<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sensor
            sensor_family: SensorFamily::Dht22,
            sensor_backend: SensorBackend::Sysfs,
            sensor_gpio: pins::DHT_DATA_GPIO,
            max_retries: 10,
            retry_cooldown_ms: 1500, // DHT22 re-arm time
            min_interval_ms: 2000,
            sim_corruption: DEFAULT_CORRUPTION,

            // Monitor
            lag: 0.1,
            conserve: true,
            store: StoreKind::Csv,
            store_path: PathBuf::from("pimon.csv"),

            // Warning LED
            led_gpio: pins::WARNING_LED_GPIO,
            thresholds: ThreatTable::default_thresholds(),
            terminal_level: RiskLevel::Extreme,
            patterns: PatternTable::default(),

            // Status
            status_listen: None,
        }
    }
}

impl SystemConfig {
    /// Reject out-of-range values.  Never clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.lag > 0.0 && self.lag <= 1.0) {
            return Err(ConfigError::ValidationFailed("lag must be in (0, 1]"));
        }
        if self.min_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("min_interval_ms must be > 0"));
        }
        if self.retry_cooldown_ms == 0 {
            return Err(ConfigError::ValidationFailed("retry_cooldown_ms must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.sim_corruption) {
            return Err(ConfigError::ValidationFailed("sim_corruption must be in [0, 1]"));
        }
        if self.sensor_gpio == self.led_gpio {
            return Err(ConfigError::ValidationFailed(
                "sensor and LED must use different GPIO lines",
            ));
        }
        if self.store != StoreKind::None && self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed("store_path must not be empty"));
        }
        self.threat_table()?;
        self.patterns.validate()?;
        self.status_addr()?;
        Ok(())
    }

    pub fn threat_table(&self) -> Result<ThreatTable, ConfigError> {
        ThreatTable::new(self.thresholds.clone(), self.terminal_level)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            cooldown: core::time::Duration::from_millis(self.retry_cooldown_ms),
        }
    }

    pub fn min_interval(&self) -> core::time::Duration {
        core::time::Duration::from_millis(self.min_interval_ms)
    }

    /// Resolve `status_listen`.  A bare `:port` listens on every interface.
    pub fn status_addr(&self) -> Result<Option<SocketAddr>, ConfigError> {
        let Some(listen) = self.status_listen.as_deref() else {
            return Ok(None);
        };
        let listen = if listen.starts_with(':') {
            format!("0.0.0.0{listen}")
        } else {
            listen.to_owned()
        };
        listen
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .map(Some)
            .ok_or(ConfigError::ValidationFailed("status_listen is not host:port"))
    }
}
