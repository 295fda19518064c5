//! Read-only view of the trailing window of a file
//!
//! The metadata block sits near the end of a package that can be
//! hundreds of megabytes, so only the last `block_size` bytes are
//! mapped. The mapping is released when the window is dropped, on
//! every exit path.

use std::fs::File;
use std::path::Path;

use memmap2::MmapOptions;
use tracing::debug;

use crate::error::{ChannelError, Result};

/// Memory-mapped view of the last `min(block_size, file_size)` bytes
/// of a regular file.
#[derive(Debug)]
pub struct TailWindow {
    mmap: memmap2::Mmap,
    base_offset: u64,
}

impl TailWindow {
    /// Map the trailing window of the file at `path`.
    ///
    /// For a file of size `S`, the window covers `[0, S)` when
    /// `S <= block_size` and `[S - block_size, S)` otherwise. The
    /// mapping offset need not be page-aligned here; `MmapOptions`
    /// rounds internally and the returned view corresponds to the
    /// exact logical range.
    pub fn open(path: &Path, block_size: usize) -> Result<Self> {
        let file = File::open(path).map_err(ChannelError::SourceUnreadable)?;
        let metadata = file.metadata().map_err(ChannelError::SourceUnreadable)?;
        if !metadata.is_file() {
            return Err(ChannelError::NotRegularFile(path.to_path_buf()));
        }
        let size = metadata.len();
        if size == 0 {
            // a zero-length mapping is invalid, and an empty file
            // cannot carry a block
            return Err(ChannelError::RecordAbsentOrCorrupt);
        }
        let base_offset = size.saturating_sub(block_size as u64);
        let length = (size - base_offset) as usize;

        debug!(
            "mapping trailing window of {:?}: size={} offset={} length={}",
            path, size, base_offset, length
        );

        // SAFETY: the file is opened read-only and the map is never
        // written through; concurrent truncation of the source would
        // be undefined behavior, which matches the one-shot local-tool
        // contract of this reader.
        #[allow(unsafe_code)]
        let mmap = unsafe {
            MmapOptions::new()
                .offset(base_offset)
                .len(length)
                .map(&file)
                .map_err(ChannelError::MapFailed)?
        };

        Ok(Self { mmap, base_offset })
    }

    /// The window's bytes. Byte `i` of the slice is byte
    /// `base_offset + i` of the source file.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.mmap
    }

    /// Absolute offset of the window's first byte in the source file.
    #[must_use]
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Window length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Whether the window is empty (never true for an open window).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}
