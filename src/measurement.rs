//! Measurement value type and its text renderings.
//!
//! | Rendering | Example                                              |
//! |-----------|------------------------------------------------------|
//! | Display   | `Mar  7 14:02:11: 21.3 C at 48.0% humidity`          |
//! | CSV       | `2024-03-07 14:02:11,21.3,48.0`                      |
//! | JSON      | `{"time":"2024-03-07 14:02:11","temperature":21.3,"humidity":48.0}` |
//!
//! Timestamps are UTC with whole-second resolution, so a CSV record
//! always parses back to the value it was written from (up to the
//! one-decimal rounding of the readings).

use core::fmt;

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeZone, Utc};

use crate::sensors::Reading;

/// Timestamp layout used in CSV and JSON records.
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header line of a CSV rendering.
pub const CSV_HEADER: &str = "time,temperature,humidity";

/// A timestamped temperature/humidity pair, raw or smoothed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
}

impl Measurement {
    pub fn new(timestamp: DateTime<Utc>, reading: Reading) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            temperature: reading.temperature,
            humidity: reading.humidity,
        }
    }

    /// Stamp `reading` with the current wall-clock time.
    pub fn now(reading: Reading) -> Self {
        Self::new(Utc::now(), reading)
    }

    /// Build from a Unix timestamp; `None` if it is out of range.
    pub fn from_unix(secs: i64, temperature: f64, humidity: f64) -> Option<Self> {
        let timestamp = Utc.timestamp_opt(secs, 0).single()?;
        Some(Self {
            timestamp,
            temperature,
            humidity,
        })
    }

    pub fn unix_time(&self) -> i64 {
        self.timestamp.timestamp()
    }

    /// Same readings, regardless of when they were taken.
    pub fn same(&self, other: &Self) -> bool {
        self.temperature == other.temperature && self.humidity == other.humidity
    }

    /// Fold `sample` into `self` by exponential smoothing with weight `lag`.
    pub fn smooth(&mut self, lag: f64, sample: &Self) {
        self.timestamp = sample.timestamp;
        self.temperature = (1.0 - lag) * self.temperature + lag * sample.temperature;
        self.humidity = (1.0 - lag) * self.humidity + lag * sample.humidity;
    }

    /// One CSV record, no trailing newline.
    pub fn to_record(&self) -> String {
        format!(
            "{},{:.1},{:.1}",
            self.timestamp.format(RECORD_TIME_FORMAT),
            self.temperature,
            self.humidity
        )
    }

    /// Parse one CSV record as written by [`to_record`](Self::to_record).
    pub fn from_record(line: &str) -> Result<Self, &'static str> {
        let mut fields = line.trim_end_matches(['\r', '\n']).split(',');
        let (Some(time), Some(temperature), Some(humidity), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err("invalid record length");
        };

        let timestamp = NaiveDateTime::parse_from_str(time.trim(), RECORD_TIME_FORMAT)
            .map_err(|_| "invalid timestamp")?
            .and_utc();
        let temperature = temperature
            .trim()
            .parse::<f64>()
            .map_err(|_| "invalid temperature")?;
        let humidity = humidity
            .trim()
            .parse::<f64>()
            .map_err(|_| "invalid humidity")?;

        Ok(Self {
            timestamp,
            temperature,
            humidity,
        })
    }

    /// Header plus this record.
    pub fn to_csv(&self) -> String {
        format!("{CSV_HEADER}\n{}\n", self.to_record())
    }

    /// JSON object with the record's timestamp and one-decimal readings.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "time": self.timestamp.format(RECORD_TIME_FORMAT).to_string(),
            "temperature": one_decimal(self.temperature),
            "humidity": one_decimal(self.humidity),
        })
        .to_string()
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.1} C at {:.1}% humidity",
            self.timestamp.format("%b %e %H:%M:%S"),
            self.temperature,
            self.humidity
        )
    }
}

fn one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// ── Series helpers ───────────────────────────────────────────

/// Parse a CSV series.  Blank lines and a leading header are skipped;
/// on failure returns the zero-based line number and the reason.
pub fn parse_csv_series(text: &str) -> Result<Vec<Measurement>, (usize, &'static str)> {
    let mut series = Vec::new();
    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() || (n == 0 && line.trim() == CSV_HEADER) {
            continue;
        }
        series.push(Measurement::from_record(line).map_err(|reason| (n, reason))?);
    }
    Ok(series)
}
