//! Reader for distribution-channel metadata embedded in APK files
//!
//! Channel-packing tools following the Packer Ng V2 convention append
//! a small metadata block after an APK's normal content: a fixed
//! 16-byte magic marker, a 4-byte little-endian length, and a
//! delimited key/value payload carrying the distribution channel the
//! package was built for. This crate recovers that channel value
//! without reading the whole file:
//!
//! 1. [`TailWindow`] memory-maps only the last 1 MiB of the file.
//! 2. [`Pattern`] locates the magic marker with a KMP search.
//! 3. [`payload`] validates the length field and parses the payload.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! # fn main() -> apk_channel::Result<()> {
//! let channel = apk_channel::read_channel(Path::new("app-release.apk"))?;
//! println!("{channel}");
//! # Ok(())
//! # }
//! ```
//!
//! A missing or corrupt record is [`ChannelError::RecordAbsentOrCorrupt`]
//! (the normal "no channel configured" outcome), distinct from hard
//! I/O failures.

#![warn(missing_docs)]

pub mod config;
mod error;
pub mod kmp;
pub mod payload;
pub mod window;

use std::path::Path;

use tracing::debug;

pub use config::BlockConfig;
pub use error::{ChannelError, Result};
pub use kmp::Pattern;
pub use window::TailWindow;

/// Read the channel value embedded in the package at `path`, using
/// the standard Packer Ng V2 block layout.
pub fn read_channel(path: &Path) -> Result<String> {
    read_channel_with(path, &BlockConfig::packer_ng_v2())
}

/// Read the channel value using an injected block layout.
pub fn read_channel_with(path: &Path, config: &BlockConfig) -> Result<String> {
    let window = TailWindow::open(path, config.block_size)?;
    let marker_end = locate_marker_end(window.data(), config)?;
    payload::decode(window.data(), marker_end, config)
}

/// Read the raw payload bytes without record parsing, using the
/// standard Packer Ng V2 block layout.
///
/// Useful for inspecting what a packer actually wrote when the record
/// itself does not parse.
pub fn read_payload(path: &Path) -> Result<Vec<u8>> {
    read_payload_with(path, &BlockConfig::packer_ng_v2())
}

/// Read the raw payload bytes using an injected block layout.
pub fn read_payload_with(path: &Path, config: &BlockConfig) -> Result<Vec<u8>> {
    let window = TailWindow::open(path, config.block_size)?;
    let marker_end = locate_marker_end(window.data(), config)?;
    payload::extract(window.data(), marker_end, config.block_size)
}

/// Find the magic marker in the window and return the index of the
/// first byte after it, where the length field starts.
fn locate_marker_end(window: &[u8], config: &BlockConfig) -> Result<usize> {
    let pattern = Pattern::new(config.magic);
    let pos = pattern
        .find(window)
        .ok_or(ChannelError::RecordAbsentOrCorrupt)?;
    debug!("magic marker found, match starts at window index {}", pos - 1);
    Ok((pos - 1) + config.magic.len())
}
