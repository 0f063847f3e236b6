//! Linux sysfs GPIO adapters.
//!
//! - [`SysfsOutputPin`]: `embedded_hal` output pin for the warning LED.
//! - [`SysfsPulseCapture`]: best-effort DHTxx capture by polling the
//!   line's `value` file.
//!
//! sysfs polling costs a few microseconds per sample, which is enough to
//! separate the 26 µs and 70 µs bit widths on a Pi-class CPU but not with
//! much margin.  Failed captures are expected and absorbed by the retry
//! policy.

use core::time::Duration;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use embedded_hal::digital::{self, ErrorType, OutputPin};
use log::{debug, info};

use crate::app::ports::PulseCapture;
use crate::error::SensorError;
use crate::pins::SYSFS_GPIO_ROOT;
use crate::sensors::{Level, Pulse, PulseTrain, SensorFamily};

/// Time udev needs to fix permissions on a freshly exported line.
const EXPORT_SETTLE: Duration = Duration::from_millis(100);

/// How long to record after releasing the line.  A full frame lasts
/// about 5 ms.
const CAPTURE_WINDOW: Duration = Duration::from_millis(10);

fn line_dir(line: u32) -> PathBuf {
    PathBuf::from(format!("{SYSFS_GPIO_ROOT}/gpio{line}"))
}

/// Export `line` if it is not exported yet.
fn export(line: u32) -> io::Result<PathBuf> {
    let dir = line_dir(line);
    if !dir.exists() {
        fs::write(format!("{SYSFS_GPIO_ROOT}/export"), line.to_string())?;
        thread::sleep(EXPORT_SETTLE);
        info!("GPIO{}: exported", line);
    }
    Ok(dir)
}

fn set_direction(dir: &std::path::Path, direction: &str) -> io::Result<()> {
    fs::write(dir.join("direction"), direction)
}

// ── Output pin ───────────────────────────────────────────────

/// I/O failure on a sysfs line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError(pub io::ErrorKind);

impl digital::Error for GpioError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

pub struct SysfsOutputPin {
    value: File,
}

impl SysfsOutputPin {
    /// Export `line` and configure it as an output, initially low.
    pub fn new(line: u32) -> io::Result<Self> {
        let dir = export(line)?;
        set_direction(&dir, "low")?;
        let value = OpenOptions::new().write(true).open(dir.join("value"))?;
        info!("GPIO{}: output", line);
        Ok(Self { value })
    }

    fn write_level(&mut self, high: bool) -> Result<(), GpioError> {
        self.value
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.value.write_all(if high { b"1" } else { b"0" }))
            .map_err(|e| GpioError(e.kind()))
    }
}

impl ErrorType for SysfsOutputPin {
    type Error = GpioError;
}

impl OutputPin for SysfsOutputPin {
    fn set_low(&mut self) -> Result<(), GpioError> {
        self.write_level(false)
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        self.write_level(true)
    }
}

// ── Pulse capture ────────────────────────────────────────────

pub struct SysfsPulseCapture {
    line: u32,
    dir: PathBuf,
    /// How long the host holds the line low to wake the sensor.
    start_signal: Duration,
}

impl SysfsPulseCapture {
    pub fn new(line: u32, family: SensorFamily) -> io::Result<Self> {
        let dir = export(line)?;
        let start_signal = match family {
            SensorFamily::Dht11 => Duration::from_millis(18),
            SensorFamily::Dht22 => Duration::from_millis(2),
        };
        info!("GPIO{}: {:?} capture", line, family);
        Ok(Self {
            line,
            dir,
            start_signal,
        })
    }

    fn read_level(value: &mut File) -> io::Result<Level> {
        let mut buf = [0u8; 1];
        value.seek(SeekFrom::Start(0))?;
        value.read_exact(&mut buf)?;
        Ok(if buf[0] == b'1' { Level::High } else { Level::Low })
    }
}

impl PulseCapture for SysfsPulseCapture {
    fn capture(&mut self) -> Result<PulseTrain, SensorError> {
        // Wake-up: drive low, then release and let the pull-up take over.
        set_direction(&self.dir, "low")?;
        thread::sleep(self.start_signal);
        set_direction(&self.dir, "in")?;

        let mut value = File::open(self.dir.join("value"))?;
        let mut train = PulseTrain::new();
        let mut level = Self::read_level(&mut value)?;
        let mut since = Instant::now();
        let deadline = since + CAPTURE_WINDOW;

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let next = Self::read_level(&mut value)?;
            if next != level {
                let pulse = Pulse {
                    level,
                    duration: now - since,
                };
                if train.push(pulse).is_err() {
                    break;
                }
                level = next;
                since = now;
            }
        }

        debug!("GPIO{}: captured {} pulses", self.line, train.len());
        Ok(train)
    }
}
