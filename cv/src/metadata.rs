//! Volume size resolution
//!
//! The downloader may leave a `torrent.info` file beside the chunks:
//!
//! ```text
//! block_size: 4096
//! blocks_total: 262144
//! ```
//!
//! When both fields parse, the volume is `block_size * blocks_total` bytes.
//! Otherwise the device falls back to [`DEFAULT_VOLUME_SIZE`], so generic
//! block tools never see a truncated address space.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::MetadataError;
use crate::{DEFAULT_VOLUME_SIZE, METADATA_FILENAME};

static BLOCK_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^block_size:(.*)$").expect("block_size pattern is valid"));

static BLOCKS_TOTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^blocks_total:(.*)$").expect("blocks_total pattern is valid"));

/// Geometry read from the metadata file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeMetadata {
    pub block_size: u64,
    pub blocks_total: u64,
}

impl VolumeMetadata {
    /// Parse the line-oriented `key: value` text
    pub fn parse(content: &str) -> Result<Self, MetadataError> {
        Ok(Self {
            block_size: parse_field(content, &BLOCK_SIZE_RE, "block_size")?,
            blocks_total: parse_field(content, &BLOCKS_TOTAL_RE, "blocks_total")?,
        })
    }

    /// Read and parse the metadata file in `root`
    pub fn load(root: &Path) -> Result<Self, MetadataError> {
        let path = root.join(METADATA_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(MetadataError::NotFound),
            Err(source) => return Err(MetadataError::Read { path, source }),
        };
        Self::parse(&content)
    }

    /// Volume size in bytes
    pub fn size(&self) -> Result<u64, MetadataError> {
        self.block_size
            .checked_mul(self.blocks_total)
            .ok_or(MetadataError::Overflow {
                block_size: self.block_size,
                blocks_total: self.blocks_total,
            })
    }
}

fn parse_field(content: &str, re: &Regex, field: &'static str) -> Result<u64, MetadataError> {
    let value = re
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or(MetadataError::MissingField { field })?;

    value.parse::<u64>().map_err(|_| MetadataError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Where the reported volume size came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSource {
    Metadata,
    Default,
}

/// Logical size of the volume, fixed at open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeSize {
    pub bytes: u64,
    pub source: SizeSource,
}

/// Resolve the logical volume size for the chunk directory at `root`
///
/// Never fails: any problem with the metadata file is logged and the default
/// size is used instead.
pub fn resolve_volume_size(root: &Path) -> VolumeSize {
    match VolumeMetadata::load(root).and_then(|meta| meta.size()) {
        Ok(bytes) => {
            debug!(?root, bytes, "resolve_volume_size: using metadata");
            VolumeSize {
                bytes,
                source: SizeSource::Metadata,
            }
        }
        Err(MetadataError::NotFound) => {
            debug!(?root, "resolve_volume_size: no metadata file, using default");
            VolumeSize {
                bytes: DEFAULT_VOLUME_SIZE,
                source: SizeSource::Default,
            }
        }
        Err(e) => {
            warn!(
                path = %root.join(METADATA_FILENAME).display(),
                error = %e,
                "Unusable metadata file, using default volume size"
            );
            VolumeSize {
                bytes: DEFAULT_VOLUME_SIZE,
                source: SizeSource::Default,
            }
        }
    }
}
