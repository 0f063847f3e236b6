//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] on top of a single JSON document.  Loading
//! validates before returning, so an out-of-range file is reported at
//! startup instead of surfacing as odd runtime behaviour.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::SystemConfig;
use crate::error::ConfigError;

/// Environment variable consulted when no path is given on the command line.
pub const CONFIG_ENV: &str = "PIMON_CONFIG";

pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// First CLI argument, else `$PIMON_CONFIG`; `None` means run on defaults.
    pub fn from_args_or_env(arg: Option<String>) -> Option<Self> {
        arg.or_else(|| std::env::var(CONFIG_ENV).ok())
            .filter(|p| !p.is_empty())
            .map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for FileConfig {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ConfigError::NotFound),
            Err(e) => {
                warn!("FileConfig: reading {} failed: {}", self.path.display(), e);
                return Err(ConfigError::IoError);
            }
        };
        let cfg: SystemConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("FileConfig: {} is not valid: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        cfg.validate()?;
        info!("FileConfig: loaded {}", self.path.display());
        Ok(cfg)
    }
}
