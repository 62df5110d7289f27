/// Decoding of source snapshots that may be gzip-compressed
use crate::error::{Result, SourceError};
use flate2::read::GzDecoder;
use std::io::Read;

/// Magic bytes opening every gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns true if the bytes start with the gzip magic number
pub fn is_gzip(input: &[u8]) -> bool {
    input.starts_with(&GZIP_MAGIC)
}

/// Decodes a downloaded or on-disk source snapshot into text.
///
/// Gzip input is decompressed first; anything else must already be UTF-8.
///
/// # Errors
///
/// Returns `SourceError::Decompression` if the gzip stream is corrupt
/// Returns `SourceError::Utf8` if the decoded bytes are not valid UTF-8
pub fn decode_snapshot(input: &[u8]) -> Result<String> {
    if !is_gzip(input) {
        return Ok(String::from_utf8(input.to_vec())?);
    }
    let mut decoder = GzDecoder::new(input);
    let mut buf: Vec<u8> = Vec::new();
    decoder
        .read_to_end(&mut buf)
        .map_err(|e| SourceError::Decompression(format!("gzip decompression failed: {}", e)))?;
    log::debug!(
        "[EFH] loader: inflated {} compressed bytes to {}",
        input.len(),
        buf.len()
    );
    Ok(String::from_utf8(buf)?)
}
