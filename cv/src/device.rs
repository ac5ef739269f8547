//! Per-session device handle
//!
//! A [`Device`] is built once when the host opens a connection and is shared
//! read-only by every request on it. It holds no open files, so any number of
//! threads may read through it at once.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{DeviceError, OpenError};
use crate::index::ChunkIndex;
use crate::metadata::{SizeSource, resolve_volume_size};
use crate::params::DeviceConfig;
use crate::reader::read_chunks;

/// Request flags passed through from the host
///
/// Carried for the host interface; reads behave the same for every flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFlags(pub u32);

/// A readable block volume, as the host runtime drives it
pub trait BlockSource: Send + Sync {
    /// Logical size in bytes
    fn size(&self) -> u64;

    /// Whether writes are accepted
    fn can_write(&self) -> bool;

    /// Fill `buf` from `offset`, returning the number of bytes copied
    fn read_at(&self, buf: &mut [u8], offset: u64, flags: RequestFlags) -> Result<usize, DeviceError>;

    /// Write `buf` at `offset`
    fn write_at(&self, buf: &[u8], offset: u64, flags: RequestFlags) -> Result<usize, DeviceError>;
}

/// Chunk directory snapshot for one open session
#[derive(Debug)]
pub struct Device {
    root: PathBuf,
    index: ChunkIndex,
    size: u64,
    size_source: SizeSource,
    readonly: bool,
}

impl Device {
    /// Scan the chunk directory and resolve the volume size
    pub fn open(config: &DeviceConfig, readonly: bool) -> Result<Self, OpenError> {
        debug!(root = ?config.root, readonly, "Device::open: called");
        if !readonly {
            debug!("Device::open: read-write open, writes will still be rejected");
        }

        let index = ChunkIndex::build(&config.root)?;
        let size = resolve_volume_size(&config.root);

        info!(
            root = %config.root.display(),
            chunks = index.len(),
            size = size.bytes,
            "Opened chunk device"
        );

        Ok(Self {
            root: config.root.clone(),
            index,
            size: size.bytes,
            size_source: size.source,
            readonly,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &ChunkIndex {
        &self.index
    }

    pub fn size_source(&self) -> SizeSource {
        self.size_source
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }
}

impl BlockSource for Device {
    fn size(&self) -> u64 {
        self.size
    }

    fn can_write(&self) -> bool {
        false
    }

    fn read_at(&self, buf: &mut [u8], offset: u64, _flags: RequestFlags) -> Result<usize, DeviceError> {
        read_chunks(&self.root, &self.index, buf, offset)
    }

    fn write_at(&self, buf: &[u8], offset: u64, _flags: RequestFlags) -> Result<usize, DeviceError> {
        debug!(offset, len = buf.len(), "Device::write_at: rejected");
        Err(DeviceError::WriteNotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_VOLUME_SIZE, METADATA_FILENAME};
    use std::fs;
    use tempfile::TempDir;

    fn open(temp: &TempDir, readonly: bool) -> Device {
        let config = DeviceConfig::new(temp.path()).unwrap();
        Device::open(&config, readonly).unwrap()
    }

    #[test]
    fn test_open_default_size() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("0"), [0u8; 64]).unwrap();

        let device = open(&temp, true);
        assert_eq!(device.size(), DEFAULT_VOLUME_SIZE);
        assert_eq!(device.size_source(), SizeSource::Default);
        assert_eq!(device.index().len(), 1);
    }

    #[test]
    fn test_open_metadata_size() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(METADATA_FILENAME), "block_size: 4096\nblocks_total: 3\n").unwrap();

        let device = open(&temp, true);
        assert_eq!(device.size(), 12288);
        assert_eq!(device.size_source(), SizeSource::Metadata);
    }

    #[test]
    fn test_open_invalid_chunk_fails() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("disk.img"), [0u8; 4]).unwrap();

        let config = DeviceConfig::new(temp.path()).unwrap();
        let err = Device::open(&config, true).unwrap_err();
        assert!(matches!(err, OpenError::InvalidChunkName { .. }));
    }

    #[test]
    fn test_snapshot_ignores_new_chunks() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("0"), [b'A'; 16]).unwrap();
        let device = open(&temp, true);

        fs::write(temp.path().join("10"), [b'B'; 16]).unwrap();
        let mut buf = [0u8; 32];
        assert_eq!(device.read_at(&mut buf, 0, RequestFlags::default()).unwrap(), 16);

        // A fresh open picks the new chunk up
        let device = open(&temp, true);
        assert_eq!(device.read_at(&mut buf, 0, RequestFlags::default()).unwrap(), 32);
    }

    #[test]
    fn test_write_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("0"), [b'A'; 16]).unwrap();

        for readonly in [true, false] {
            let device = open(&temp, readonly);
            assert_eq!(device.is_readonly(), readonly);
            assert!(!device.can_write());

            let err = device.write_at(b"zz", 0, RequestFlags::default()).unwrap_err();
            assert!(matches!(err, DeviceError::WriteNotSupported));
        }

        assert_eq!(fs::read(temp.path().join("0")).unwrap(), vec![b'A'; 16]);
    }
}
