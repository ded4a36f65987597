use super::StoreConfig;
use crate::error::{Result, StoreError};

/// Smallest content cap that still leaves room for the truncation marker
pub const MIN_CONTENT_CHARS: usize = 128;

pub fn validate(config: &StoreConfig) -> Result<()> {
    if config.ceiling_bytes == 0 {
        return Err(StoreError::Config("ceiling_bytes must be positive".into()));
    }
    if config.overhead_reserve >= config.ceiling_bytes {
        return Err(StoreError::Config(format!(
            "overhead_reserve ({}) must be smaller than ceiling_bytes ({})",
            config.overhead_reserve, config.ceiling_bytes
        )));
    }
    if config.max_content_chars < MIN_CONTENT_CHARS {
        return Err(StoreError::Config(format!(
            "max_content_chars must be at least {}",
            MIN_CONTENT_CHARS
        )));
    }
    if config.stripped_content_chars == 0 {
        return Err(StoreError::Config(
            "stripped_content_chars must be positive".into(),
        ));
    }
    if config.compressed_key.is_empty() || config.legacy_key.is_empty() {
        return Err(StoreError::Config("session keys must not be empty".into()));
    }
    if config.compressed_key == config.legacy_key {
        return Err(StoreError::Config(
            "compressed_key and legacy_key must differ".into(),
        ));
    }
    Ok(())
}
