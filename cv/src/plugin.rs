//! Host-facing entry points
//!
//! The block-device host drives a plugin through a fixed lifecycle:
//! parameters, completion check, then one open per client connection.
//! [`Plugin`] carries that state as a value rather than process globals.

use tracing::debug;

use crate::device::Device;
use crate::error::{ConfigError, OpenError};
use crate::params::{DeviceConfig, ParamStore};

/// How the host may schedule requests against an open device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadModel {
    /// Any number of requests in flight
    Parallel,
}

/// Exported chunk volume, from configuration to open
#[derive(Debug, Default)]
pub struct Plugin {
    params: ParamStore,
    config: Option<DeviceConfig>,
}

impl Plugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one `key=value` host parameter
    pub fn configure(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        debug!(%key, %value, "Plugin::configure: called");
        self.params.configure(key, value)?;
        // Any new parameter invalidates an earlier completion
        self.config = None;
        Ok(())
    }

    /// Validate the parameters; must succeed before [`Plugin::open`]
    pub fn config_complete(&mut self) -> Result<(), ConfigError> {
        let config = self.params.validate_complete()?;
        debug!(root = ?config.root, "Plugin::config_complete: configuration accepted");
        self.config = Some(config);
        Ok(())
    }

    pub fn thread_model(&self) -> ThreadModel {
        ThreadModel::Parallel
    }

    /// Open a device session against the configured directory
    pub fn open(&self, readonly: bool) -> Result<Device, OpenError> {
        let config = self.config.as_ref().ok_or(OpenError::NotConfigured)?;
        Device::open(config, readonly)
    }
}
