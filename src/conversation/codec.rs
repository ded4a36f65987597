//! Persisted form of a conversation: compact JSON, zlib, standard base64.

use crate::error::{Result, StoreError};
use crate::models::Message;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

pub fn encode(messages: &[Message]) -> Result<String> {
    let json = serde_json::to_vec(messages)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| StoreError::Codec(format!("compression failed: {}", e)))?;
    let compressed = encoder
        .finish()
        .map_err(|e| StoreError::Codec(format!("compression failed: {}", e)))?;
    Ok(STANDARD.encode(compressed))
}

/// Byte length of the encoded payload for `messages`.
pub fn encoded_len(messages: &[Message]) -> Result<usize> {
    encode(messages).map(|payload| payload.len())
}

/// Inverse of [`encode`]. Inflated output is capped at `max_decoded_bytes`.
pub fn decode(payload: &str, max_decoded_bytes: usize) -> Result<Vec<Message>> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Ok(Vec::new());
    }

    let compressed = STANDARD.decode(payload)?;
    let limit = (max_decoded_bytes as u64).saturating_add(1);
    let mut decoder = ZlibDecoder::new(compressed.as_slice()).take(limit);
    let mut json = Vec::new();
    decoder
        .read_to_end(&mut json)
        .map_err(|e| StoreError::Codec(format!("decompression failed: {}", e)))?;
    if json.len() > max_decoded_bytes {
        return Err(StoreError::Codec(format!(
            "decompressed payload exceeds {} bytes",
            max_decoded_bytes
        )));
    }

    Ok(serde_json::from_slice(&json)?)
}

/// Parse the uncompressed JSON array written by older releases.
pub fn parse_legacy(raw: &str) -> Result<Vec<Message>> {
    Ok(serde_json::from_str(raw)?)
}
