//! Default GPIO assignments for a Raspberry Pi header.
//!
//! Single source of truth for the defaults in
//! [`SystemConfig`](crate::config::SystemConfig); the configuration file
//! overrides them per installation.  Numbers are BCM (sysfs) line numbers,
//! not physical header pins.

// ---------------------------------------------------------------------------
// Sensor (DHT22 / AM2302, single-wire, 10 kΩ pull-up to 3V3)
// ---------------------------------------------------------------------------

/// DHT data line.  Header pin 7.
pub const DHT_DATA_GPIO: u32 = 4;

// ---------------------------------------------------------------------------
// Warning LED (active HIGH through a 330 Ω series resistor)
// ---------------------------------------------------------------------------

/// Warning LED anode.  Header pin 11.
pub const WARNING_LED_GPIO: u32 = 17;

// ---------------------------------------------------------------------------
// sysfs GPIO interface
// ---------------------------------------------------------------------------

/// Root of the sysfs GPIO class directory.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";
