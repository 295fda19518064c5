//! Payload extraction and channel record parsing
//!
//! Immediately after the magic marker the block carries a 4-byte
//! little-endian signed length followed by that many payload bytes.
//! The payload text is `KEY ∘ VALUE ∙ ...`; the channel value is the
//! byte range between the first key/value separator and the first
//! record separator.
//!
//! All searches are slice-bounded byte-sequence searches. The
//! separators are multi-byte UTF-8 glyphs and the payload may contain
//! embedded NUL bytes, so C-string style scanning is not an option.

use tracing::debug;

use crate::config::BlockConfig;
use crate::error::{ChannelError, Result};
use crate::kmp::Pattern;

/// Read and validate the length field at `marker_end` and copy out
/// the declared payload bytes.
///
/// `marker_end` is the window index of the first byte after the magic
/// marker, where the length field starts. A length outside
/// `[0, max_len]`, or one that would run past the window, is the
/// "record absent or corrupt" outcome.
pub fn extract(window: &[u8], marker_end: usize, max_len: usize) -> Result<Vec<u8>> {
    let len_field = window
        .get(marker_end..marker_end + 4)
        .ok_or(ChannelError::RecordAbsentOrCorrupt)?;
    // infallible: the slice is exactly 4 bytes
    let payload_len = i32::from_le_bytes(
        len_field
            .try_into()
            .map_err(|_| ChannelError::RecordAbsentOrCorrupt)?,
    );
    if payload_len < 0 || payload_len as usize > max_len {
        debug!("declared payload length {} out of bounds", payload_len);
        return Err(ChannelError::RecordAbsentOrCorrupt);
    }
    let start = marker_end + 4;
    let payload = window
        .get(start..start + payload_len as usize)
        .ok_or(ChannelError::RecordAbsentOrCorrupt)?;
    Ok(payload.to_vec())
}

/// Parse the first key/value pair of `payload` and return the value.
///
/// The value is the byte-exact range between the end of the first
/// key/value separator and the start of the first record separator.
/// Missing or out-of-order separators, or a value range that is not
/// valid UTF-8, make the record malformed.
pub fn parse_channel(payload: &[u8], config: &BlockConfig) -> Result<String> {
    let sep_kv = Pattern::new(config.sep_kv.as_bytes());
    let sep_line = Pattern::new(config.sep_line.as_bytes());

    let kv_pos = sep_kv
        .find(payload)
        .ok_or(ChannelError::MalformedRecord)?;
    let line_pos = sep_line
        .find(payload)
        .ok_or(ChannelError::MalformedRecord)?;

    // find() reports one past the match start
    let value_start = (kv_pos - 1) + config.sep_kv.len();
    let value_end = line_pos - 1;
    if value_end < value_start {
        debug!(
            "separators out of order: value_start={} value_end={}",
            value_start, value_end
        );
        return Err(ChannelError::MalformedRecord);
    }

    let value = payload[value_start..value_end].to_vec();
    String::from_utf8(value).map_err(|_| ChannelError::MalformedRecord)
}

/// Decode the channel value from a window, given the index of the
/// first byte after the magic marker.
pub fn decode(window: &[u8], marker_end: usize, config: &BlockConfig) -> Result<String> {
    let payload = extract(window, marker_end, config.block_size)?;
    debug!("extracted payload of {} bytes", payload.len());
    parse_channel(&payload, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BLOCK_MAGIC, CHANNEL_KEY, SEP_KV, SEP_LINE};
    use pretty_assertions::assert_eq;

    /// `MAGIC + len + payload` laid out as the packer writes it.
    fn synthetic_block(payload: &[u8]) -> Vec<u8> {
        let mut block = Vec::new();
        block.extend_from_slice(BLOCK_MAGIC);
        block.extend_from_slice(&(payload.len() as i32).to_le_bytes());
        block.extend_from_slice(payload);
        block
    }

    fn channel_payload(value: &str) -> Vec<u8> {
        format!("{CHANNEL_KEY}{SEP_KV}{value}{SEP_LINE}").into_bytes()
    }

    #[test]
    fn round_trip_channel_value() {
        let block = synthetic_block(&channel_payload("abc123"));
        let config = BlockConfig::packer_ng_v2();
        let channel = decode(&block, BLOCK_MAGIC.len(), &config).unwrap();
        assert_eq!(channel, "abc123");
    }

    #[test]
    fn value_is_extracted_byte_exact() {
        // surrounding whitespace must survive
        let block = synthetic_block(&channel_payload(" spaced out "));
        let config = BlockConfig::packer_ng_v2();
        let channel = decode(&block, BLOCK_MAGIC.len(), &config).unwrap();
        assert_eq!(channel, " spaced out ");
    }

    #[test]
    fn only_first_pair_is_consumed() {
        let payload =
            format!("{CHANNEL_KEY}{SEP_KV}first{SEP_LINE}OTHER{SEP_KV}second{SEP_LINE}")
                .into_bytes();
        let block = synthetic_block(&payload);
        let config = BlockConfig::packer_ng_v2();
        assert_eq!(decode(&block, BLOCK_MAGIC.len(), &config).unwrap(), "first");
    }

    #[test]
    fn negative_length_is_record_absent() {
        let mut block = Vec::new();
        block.extend_from_slice(BLOCK_MAGIC);
        block.extend_from_slice(&(-1i32).to_le_bytes());
        block.extend_from_slice(&[0u8; 32]);
        let config = BlockConfig::packer_ng_v2();
        let err = decode(&block, BLOCK_MAGIC.len(), &config).unwrap_err();
        assert!(matches!(err, ChannelError::RecordAbsentOrCorrupt));
    }

    #[test]
    fn oversized_length_is_record_absent() {
        let config = BlockConfig::packer_ng_v2();
        let mut block = Vec::new();
        block.extend_from_slice(BLOCK_MAGIC);
        block.extend_from_slice(&((config.block_size as i32) + 1).to_le_bytes());
        block.extend_from_slice(&[0u8; 32]);
        let err = decode(&block, BLOCK_MAGIC.len(), &config).unwrap_err();
        assert!(matches!(err, ChannelError::RecordAbsentOrCorrupt));
    }

    #[test]
    fn length_running_past_window_is_record_absent() {
        let mut block = Vec::new();
        block.extend_from_slice(BLOCK_MAGIC);
        block.extend_from_slice(&64i32.to_le_bytes());
        block.extend_from_slice(&[b'x'; 16]); // 48 bytes short
        let config = BlockConfig::packer_ng_v2();
        let err = decode(&block, BLOCK_MAGIC.len(), &config).unwrap_err();
        assert!(matches!(err, ChannelError::RecordAbsentOrCorrupt));
    }

    #[test]
    fn truncated_length_field_is_record_absent() {
        let mut block = Vec::new();
        block.extend_from_slice(BLOCK_MAGIC);
        block.extend_from_slice(&[0x11, 0x22]);
        let err = extract(&block, BLOCK_MAGIC.len(), 1024).unwrap_err();
        assert!(matches!(err, ChannelError::RecordAbsentOrCorrupt));
    }

    #[test]
    fn missing_kv_separator_is_malformed() {
        let payload = format!("{CHANNEL_KEY}value{SEP_LINE}").into_bytes();
        let config = BlockConfig::packer_ng_v2();
        let err = parse_channel(&payload, &config).unwrap_err();
        assert!(matches!(err, ChannelError::MalformedRecord));
    }

    #[test]
    fn missing_line_separator_is_malformed() {
        let payload = format!("{CHANNEL_KEY}{SEP_KV}value").into_bytes();
        let config = BlockConfig::packer_ng_v2();
        let err = parse_channel(&payload, &config).unwrap_err();
        assert!(matches!(err, ChannelError::MalformedRecord));
    }

    #[test]
    fn line_separator_before_kv_separator_is_malformed() {
        let payload = format!("{SEP_LINE}{CHANNEL_KEY}{SEP_KV}value").into_bytes();
        let config = BlockConfig::packer_ng_v2();
        let err = parse_channel(&payload, &config).unwrap_err();
        assert!(matches!(err, ChannelError::MalformedRecord));
    }

    #[test]
    fn empty_value_between_adjacent_separators() {
        let payload = format!("{CHANNEL_KEY}{SEP_KV}{SEP_LINE}").into_bytes();
        let config = BlockConfig::packer_ng_v2();
        assert_eq!(parse_channel(&payload, &config).unwrap(), "");
    }

    #[test]
    fn payload_with_embedded_nul_bytes_still_parses() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&[0u8, 0u8]);
        payload.extend_from_slice(&channel_payload("nulsafe"));
        let config = BlockConfig::packer_ng_v2();
        assert_eq!(parse_channel(&payload, &config).unwrap(), "nulsafe");
    }

    #[test]
    fn non_utf8_value_is_malformed() {
        let mut payload = Vec::new();
        payload.extend_from_slice(CHANNEL_KEY.as_bytes());
        payload.extend_from_slice(SEP_KV.as_bytes());
        payload.extend_from_slice(&[0xff, 0xfe]);
        payload.extend_from_slice(SEP_LINE.as_bytes());
        let config = BlockConfig::packer_ng_v2();
        let err = parse_channel(&payload, &config).unwrap_err();
        assert!(matches!(err, ChannelError::MalformedRecord));
    }
}
