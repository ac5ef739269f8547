//! Host parameters for the chunk device
//!
//! The host hands over `key=value` pairs one at a time, then asks whether the
//! set is complete. Completion yields an immutable [`DeviceConfig`] that the
//! device captures at open.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::PATH_PARAM;
use crate::error::ConfigError;

/// Validated configuration for one exported volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Absolute path of the chunk directory
    pub root: PathBuf,
}

impl DeviceConfig {
    /// Build a config from a path, normalizing it the same way `configure` does
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self {
            root: absolutize(root.as_ref())?,
        })
    }
}

/// Accumulates host parameters until they are validated
#[derive(Debug, Default)]
pub struct ParamStore {
    root: Option<PathBuf>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one host parameter
    ///
    /// Only `path` is recognized. A repeated `path` replaces the earlier one.
    pub fn configure(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        if key != PATH_PARAM {
            return Err(ConfigError::UnknownParameter { key: key.to_string() });
        }

        let root = absolutize(Path::new(value))?;
        debug!(?root, "configure: chunk directory set");
        self.root = Some(root);
        Ok(())
    }

    /// Check that every required parameter was supplied
    pub fn validate_complete(&self) -> Result<DeviceConfig, ConfigError> {
        match &self.root {
            Some(root) => Ok(DeviceConfig { root: root.clone() }),
            None => Err(ConfigError::MissingParameter {
                key: PATH_PARAM.to_string(),
            }),
        }
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(path).map_err(|source| ConfigError::InvalidPath {
        value: path.display().to_string(),
        source,
    })
}
