//! CSV measurement log.
//!
//! One `YYYY-MM-DD HH:MM:SS,temperature,humidity` line per record, no
//! header, opened in append mode.  Each append is flushed so the file is
//! readable by other tools while the monitor runs.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::RecordStore;
use crate::error::StoreError;
use crate::measurement::{Measurement, parse_csv_series};

pub struct CsvStore {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl CsvStore {
    /// Open (creating if needed) the log at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!("CsvStore: appending to {}", path.display());
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for CsvStore {
    fn load_all(&mut self) -> Result<Vec<Measurement>, StoreError> {
        let text = fs::read_to_string(&self.path)?;
        parse_csv_series(&text).map_err(|(record, reason)| StoreError::Malformed { record, reason })
    }

    fn append(&mut self, measurement: &Measurement) -> Result<(), StoreError> {
        let writer = self.writer.as_mut().ok_or(StoreError::Closed)?;
        writeln!(writer, "{}", measurement.to_record())?;
        writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
            info!("CsvStore: closed {}", self.path.display());
        }
        Ok(())
    }
}
