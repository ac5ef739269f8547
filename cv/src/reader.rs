//! Read path across chunks
//!
//! A request is served by walking consecutive chunks from the one covering
//! the start offset. Each chunk is opened fresh and its current length
//! queried, because the downloader may still be appending to it. The walk
//! stops at the first hole and never skips ahead to a later chunk.

use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::Path;

use tracing::trace;

use crate::error::DeviceError;
use crate::index::ChunkIndex;

/// Fill `buf` with volume bytes starting at `offset`
///
/// Returns how many bytes were copied; a short count means a hole or the end
/// of the index was reached. Fails with [`DeviceError::NoData`] only when no
/// byte at `offset` is present.
pub fn read_chunks(root: &Path, index: &ChunkIndex, buf: &mut [u8], offset: u64) -> Result<usize, DeviceError> {
    if buf.is_empty() {
        return Ok(0);
    }

    let Some(mut pos) = index.locate(offset) else {
        trace!(offset, "read_chunks: empty index");
        return Err(DeviceError::NoData { offset });
    };

    let mut current = offset;
    let mut filled = 0usize;

    while filled < buf.len() {
        let Some(chunk) = index.get(pos) else {
            trace!(current, "read_chunks: past last chunk");
            break;
        };

        // Offset falls in a gap before this chunk
        if current < chunk.start {
            trace!(current, chunk = %chunk.filename, "read_chunks: hole before chunk");
            break;
        }

        let path = root.join(&chunk.filename);
        let io_err = |source| DeviceError::Io {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(io_err)?;
        let mut available = file.metadata().map_err(io_err)?.len();
        if let Some(limit) = index.span_limit(pos) {
            available = available.min(limit);
        }

        let local = current - chunk.start;
        if local >= available {
            trace!(current, local, available, chunk = %chunk.filename, "read_chunks: hole in chunk");
            break;
        }

        // Nothing is addressable past u64::MAX
        let available = available.min(local.saturating_add((u64::MAX - current).saturating_add(1)));
        let remaining = buf.len() - filled;
        let len = usize::try_from(available - local).map_or(remaining, |n| n.min(remaining));
        trace!(chunk = %chunk.filename, local, len, filled, current, "read_chunks: copying");

        file.read_exact_at(&mut buf[filled..filled + len], local).map_err(io_err)?;

        filled += len;
        pos += 1;
        match current.checked_add(len as u64) {
            Some(next) => current = next,
            None => {
                trace!(filled, "read_chunks: reached end of address space");
                break;
            }
        }
    }

    if filled == 0 {
        return Err(DeviceError::NoData { offset });
    }
    Ok(filled)
}
