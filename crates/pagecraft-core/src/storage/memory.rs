//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult, decode_components, encode_components};
use crate::component::Component;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Designs are kept as serialized JSON so loads go through the same
/// validation as the other backends.
#[derive(Default)]
pub struct MemoryStorage {
    designs: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under a key, bypassing serialization.
    pub fn insert_raw(&self, key: &str, json: impl Into<String>) -> StorageResult<()> {
        let mut designs = self
            .designs
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        designs.insert(key.to_string(), json.into());
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, components: &[Component]) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let json = encode_components(components);
        Box::pin(async move { self.insert_raw(&key, json?) })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Vec<Component>>> {
        let key = key.to_string();
        Box::pin(async move {
            let designs = self.designs.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            let json = designs.get(&key).ok_or_else(|| StorageError::NotFound(key.clone()))?;
            decode_components(json)
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut designs = self.designs.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            designs.remove(&key);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let designs = self.designs.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            Ok(designs.keys().cloned().collect())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let designs = self.designs.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            Ok(designs.contains_key(&key))
        })
    }
}
