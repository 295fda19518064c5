use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while reading a channel record from a package file.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The source file could not be opened or stat'd.
    #[error("failed to read source file: {0}")]
    SourceUnreadable(#[source] std::io::Error),

    /// The source exists but is not a regular file.
    #[error("not a regular file: {0}")]
    NotRegularFile(PathBuf),

    /// The read-only mapping of the trailing window could not be
    /// established.
    #[error("failed to map trailing window: {0}")]
    MapFailed(#[source] std::io::Error),

    /// The magic marker is missing from the trailing window, or the
    /// declared payload length is out of bounds. This is the normal
    /// "no channel configured" outcome, not an I/O failure.
    #[error("channel record absent or corrupt")]
    RecordAbsentOrCorrupt,

    /// The payload was extracted but its separators are missing, out
    /// of order, or the value range is not valid UTF-8.
    #[error("malformed channel record")]
    MalformedRecord,
}

impl ChannelError {
    /// Whether this is a "no channel in this file" business outcome
    /// rather than a hard I/O failure. Callers report the two
    /// differently but both exit non-zero.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RecordAbsentOrCorrupt | Self::MalformedRecord
        )
    }
}

/// Result alias for channel-reading operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
