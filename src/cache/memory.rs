// In-memory keyed cache.

use std::collections::HashMap;
use std::sync::Mutex;

use super::KeyedCache;
use crate::error::{Result, ViewError};

/// Process-local cache; entries live as long as the value.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyedCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| ViewError::Other(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, body: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ViewError::Other(e.to_string()))?;
        entries.insert(key.to_string(), body.to_vec());
        Ok(())
    }
}
