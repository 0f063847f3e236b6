//! Binary measurement log.
//!
//! Wire format, repeated once per record:
//! ```text
//! ┌────────────┬───────────────────────────────────────────┐
//! │ Length (4B)│ postcard(Record { unix_time, t, h })      │
//! │ LE u32     │                                           │
//! └────────────┴───────────────────────────────────────────┘
//! ```
//!
//! A torn final frame (power loss mid-append) is dropped and the file
//! truncated back to the last complete record on load, so later appends
//! start on a frame boundary.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::RecordStore;
use crate::error::StoreError;
use crate::measurement::Measurement;

/// Frame header size (4-byte little-endian length).
const HEADER_SIZE: usize = 4;

/// Largest payload accepted; a record encodes to well under this.
const MAX_RECORD_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Record {
    unix_time: i64,
    temperature: f64,
    humidity: f64,
}

impl From<&Measurement> for Record {
    fn from(m: &Measurement) -> Self {
        Self {
            unix_time: m.unix_time(),
            temperature: m.temperature,
            humidity: m.humidity,
        }
    }
}

/// Encode one framed record.
fn encode_frame(m: &Measurement) -> Result<Vec<u8>, StoreError> {
    let payload = postcard::to_allocvec(&Record::from(m)).map_err(|_| StoreError::Malformed {
        record: 0,
        reason: "record does not serialise",
    })?;
    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode every complete frame in `bytes`.  Returns the records and the
/// byte length they occupy; anything past that is a torn tail.
fn decode_frames(bytes: &[u8]) -> Result<(Vec<Measurement>, usize), StoreError> {
    let mut records = Vec::new();
    let mut offset = 0;
    while bytes.len() - offset >= HEADER_SIZE {
        let mut len = [0u8; HEADER_SIZE];
        len.copy_from_slice(&bytes[offset..offset + HEADER_SIZE]);
        let len = u32::from_le_bytes(len) as usize;

        let malformed = |reason| StoreError::Malformed {
            record: records.len(),
            reason,
        };
        if len == 0 || len > MAX_RECORD_SIZE {
            return Err(malformed("frame length out of range"));
        }
        let start = offset + HEADER_SIZE;
        if bytes.len() - start < len {
            break;
        }

        let r: Record =
            postcard::from_bytes(&bytes[start..start + len]).map_err(|_| malformed("bad payload"))?;
        let m = Measurement::from_unix(r.unix_time, r.temperature, r.humidity)
            .ok_or_else(|| malformed("timestamp out of range"))?;
        records.push(m);
        offset = start + len;
    }
    Ok((records, offset))
}

pub struct BinaryStore {
    path: PathBuf,
    file: Option<File>,
}

impl BinaryStore {
    /// Open (creating if needed) the log at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        info!("BinaryStore: appending to {}", path.display());
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for BinaryStore {
    fn load_all(&mut self) -> Result<Vec<Measurement>, StoreError> {
        let file = self.file.as_mut().ok_or(StoreError::Closed)?;
        let mut bytes = Vec::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_to_end(&mut bytes)?;

        let (records, used) = decode_frames(&bytes)?;
        if used < bytes.len() {
            warn!(
                "BinaryStore: dropping {} byte torn record at end of {}",
                bytes.len() - used,
                self.path.display()
            );
            file.set_len(used as u64)?;
        }
        Ok(records)
    }

    fn append(&mut self, measurement: &Measurement) -> Result<(), StoreError> {
        let file = self.file.as_mut().ok_or(StoreError::Closed)?;
        file.write_all(&encode_frame(measurement)?)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
            info!("BinaryStore: closed {}", self.path.display());
        }
        Ok(())
    }
}
