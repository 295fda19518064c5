//! Layout constants for the appended metadata block
//!
//! The packer appends its block after the APK's normal content:
//!
//! ```text
//! OFFSET   DATA TYPE        DESCRIPTION
//! @+0      magic string     16 ASCII bytes
//! @+16     payload length   i32, little-endian
//! @+20     payload          payload bytes (UTF-8 key/value text)
//! ```
//!
//! The payload is `KEY ∘ VALUE ∙` repeated; only the first pair is
//! consumed by this reader.

/// Magic marker opening the metadata block, 16 ASCII bytes.
pub const BLOCK_MAGIC: &[u8; 16] = b"Packer Ng Sig V2";

/// Key/value separator inside the payload (U+2218, 3 bytes in UTF-8).
pub const SEP_KV: &str = "\u{2218}";

/// Record separator inside the payload (U+2219, 3 bytes in UTF-8).
pub const SEP_LINE: &str = "\u{2219}";

/// Maximum trailing window searched for the marker, and the upper
/// bound for a valid declared payload length (1 MiB).
pub const BLOCK_SIZE_MAX: usize = 0x10_0000;

/// Key the packer writes for the channel value. The reader extracts
/// the first pair positionally and never matches on the key itself.
pub const CHANNEL_KEY: &str = "CHANNEL";

/// Immutable description of a block layout.
///
/// The components take a `&BlockConfig` instead of touching the
/// constants directly, so tests can inject synthetic layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockConfig {
    /// Magic byte sequence opening the block.
    pub magic: &'static [u8],
    /// Key/value separator token.
    pub sep_kv: &'static str,
    /// Record separator token.
    pub sep_line: &'static str,
    /// Trailing window size and payload length bound, in bytes.
    pub block_size: usize,
}

impl BlockConfig {
    /// The Packer Ng V2 layout used by real packed APKs.
    #[must_use]
    pub const fn packer_ng_v2() -> Self {
        Self {
            magic: BLOCK_MAGIC,
            sep_kv: SEP_KV,
            sep_line: SEP_LINE,
            block_size: BLOCK_SIZE_MAX,
        }
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self::packer_ng_v2()
    }
}
