//! ChunkVol - read-only virtual block device over a chunk directory
//!
//! An external downloader drops chunk files into a directory, each named by
//! the logical byte offset (in hex) at which its content begins. ChunkVol
//! presents that directory as one contiguous volume that a block-device host
//! can read at arbitrary offsets, returning exactly the bytes present so far.
//!
//! # Layout
//!
//! ```text
//! <root>/
//! ├── torrent.info     # optional: block_size / blocks_total
//! ├── 0                # bytes [0x0, 0x40)
//! ├── 40               # bytes [0x40, 0x80)
//! └── 80               # bytes [0x80, ...), possibly still growing
//! ```
//!
//! # Example
//!
//! ```ignore
//! use chunkvol::{Plugin, RequestFlags};
//!
//! let mut plugin = Plugin::new();
//! plugin.configure("path", "/var/lib/chunks")?;
//! plugin.config_complete()?;
//! let device = plugin.open(true)?;
//!
//! let mut buf = vec![0u8; 4096];
//! let n = device.read_at(&mut buf, 0, RequestFlags::default())?;
//! ```
//!
//! # Modules
//!
//! - [`params`] - host key/value parameters and their validation
//! - [`metadata`] - volume size resolution from `torrent.info`
//! - [`index`] - chunk directory scan and offset lookup
//! - [`reader`] - the read path across chunks and holes
//! - [`device`] - per-session device handle
//! - [`plugin`] - host-facing entry points
//! - [`config`] - YAML configuration for the `cv` tool
//! - [`cli`] - command-line interface for the `cv` tool

pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod index;
pub mod metadata;
pub mod params;
pub mod plugin;
pub mod reader;

pub use device::{BlockSource, Device, RequestFlags};
pub use error::{ConfigError, DeviceError, MetadataError, OpenError};
pub use index::{ChunkIndex, ChunkRef};
pub use metadata::{SizeSource, VolumeMetadata, VolumeSize};
pub use params::{DeviceConfig, ParamStore};
pub use plugin::{Plugin, ThreadModel};

/// Name of the only accepted host parameter
pub const PATH_PARAM: &str = "path";

/// File in the chunk directory that carries the volume geometry
pub const METADATA_FILENAME: &str = "torrent.info";

/// Logical size reported when no usable metadata file exists (16 TiB)
pub const DEFAULT_VOLUME_SIZE: u64 = 16 * 1024 * 1024 * 1024 * 1024;
