//! Chunk index built from the chunk directory
//!
//! Every regular file in the directory other than the metadata file is a
//! chunk named by its starting offset in hex. The index is scanned once per
//! open and never refreshed; chunks that appear later are picked up by the
//! next open.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::METADATA_FILENAME;
use crate::error::OpenError;

/// One chunk file and the logical offset where its bytes begin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRef {
    pub start: u64,
    pub filename: String,
}

/// Chunks ordered by strictly increasing start offset
#[derive(Debug, Clone, Default)]
pub struct ChunkIndex {
    chunks: Vec<ChunkRef>,
}

impl ChunkIndex {
    /// Scan `root` and build the index
    ///
    /// Fails closed: a file whose name is not a hex offset, or two names that
    /// resolve to the same offset, abort the whole scan.
    pub fn build(root: &Path) -> Result<Self, OpenError> {
        let read_dir_err = |source| OpenError::ReadDir {
            path: root.to_path_buf(),
            source,
        };

        let mut chunks = Vec::new();
        for entry in fs::read_dir(root).map_err(read_dir_err)? {
            let entry = entry.map_err(read_dir_err)?;
            let name = entry.file_name();
            if name == METADATA_FILENAME {
                continue;
            }

            // Follows symlinks, so a link to a regular file counts as a chunk
            let is_file = fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false);
            if !is_file {
                debug!(path = ?entry.path(), "ChunkIndex::build: skipping non-regular entry");
                continue;
            }

            let filename = name.into_string().map_err(|raw| OpenError::InvalidChunkName {
                name: raw.to_string_lossy().into_owned(),
            })?;
            let start = parse_chunk_name(&filename)?;
            chunks.push(ChunkRef { start, filename });
        }

        let index = Self::from_chunks(chunks)?;
        debug!(?root, chunks = index.len(), "ChunkIndex::build: scan complete");
        Ok(index)
    }

    /// Order chunks numerically and reject duplicate offsets
    pub fn from_chunks(mut chunks: Vec<ChunkRef>) -> Result<Self, OpenError> {
        chunks.sort_by_key(|c| c.start);

        if let Some(pair) = chunks.windows(2).find(|w| w[0].start == w[1].start) {
            return Err(OpenError::DuplicateOffset {
                offset: pair[0].start,
                first: pair[0].filename.clone(),
                second: pair[1].filename.clone(),
            });
        }

        Ok(Self { chunks })
    }

    /// Position of the chunk to start a read at `offset`
    ///
    /// This is the last chunk starting at or before `offset`, or the first
    /// chunk when `offset` precedes all of them. `None` for an empty index.
    pub fn locate(&self, offset: u64) -> Option<usize> {
        if self.chunks.is_empty() {
            return None;
        }
        let after = self.chunks.partition_point(|c| c.start <= offset);
        Some(after.saturating_sub(1))
    }

    /// Distance from chunk `pos` to its successor, `None` for the last chunk
    pub fn span_limit(&self, pos: usize) -> Option<u64> {
        let next = self.chunks.get(pos + 1)?;
        Some(next.start - self.chunks[pos].start)
    }

    pub fn get(&self, pos: usize) -> Option<&ChunkRef> {
        self.chunks.get(pos)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChunkRef> {
        self.chunks.iter()
    }
}

/// Parse a chunk filename as an unprefixed, case-insensitive hex offset
pub fn parse_chunk_name(name: &str) -> Result<u64, OpenError> {
    let invalid = || OpenError::InvalidChunkName { name: name.to_string() };

    // from_str_radix alone would also take a leading '+'
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u64::from_str_radix(name, 16).map_err(|_| invalid())
}
