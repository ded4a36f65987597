use super::storage::SessionBackend;
use crate::error::{Result, StoreError};
use std::collections::HashMap;

/// In-process session. An optional per-value limit emulates a cookie
/// transport that refuses oversized writes.
#[derive(Debug, Default, Clone)]
pub struct MemorySession {
    values: HashMap<String, String>,
    value_limit: Option<usize>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value_limit(limit: usize) -> Self {
        Self {
            values: HashMap::new(),
            value_limit: Some(limit),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SessionBackend for MemorySession {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        if let Some(limit) = self.value_limit {
            if value.len() > limit {
                return Err(StoreError::Session(format!(
                    "value for '{}' is {} bytes, transport limit is {}",
                    key,
                    value.len(),
                    limit
                )));
            }
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}
