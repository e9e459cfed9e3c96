//! Debounced auto-save of the current design.
//!
//! The manager never saves on its own: an editor subscriber marks it dirty
//! and the host polls [`AutoSaveManager::maybe_save`], which writes only once
//! the delay has passed since the most recent change.

use crate::component::Component;
use crate::config::{DEFAULT_AUTOSAVE_DELAY_MS, EditorConfig};
use crate::storage::{Storage, StorageError, StorageResult};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Key the working design is stored under.
pub const DESIGN_KEY: &str = "pagecraft-design";

/// Manages automatic design persistence.
pub struct AutoSaveManager<S: Storage> {
    /// Storage backend.
    storage: Arc<S>,
    /// Quiet period required after the last change.
    delay: Duration,
    /// Time of the most recent change.
    last_change: Option<Instant>,
    /// Last save timestamp.
    last_save: Option<Instant>,
    /// Whether the design has unsaved changes.
    dirty: bool,
    key: String,
}

impl<S: Storage> AutoSaveManager<S> {
    /// Create a new auto-save manager with the given storage backend.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            delay: Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
            last_change: None,
            last_save: None,
            dirty: false,
            key: DESIGN_KEY.to_string(),
        }
    }

    /// Create a manager using the configured debounce delay.
    pub fn with_config(storage: Arc<S>, config: &EditorConfig) -> Self {
        let mut manager = Self::new(storage);
        manager.delay = config.autosave_delay();
        manager
    }

    /// Set the debounce delay.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Store under a different key.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record a change; restarts the debounce window.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.last_change = Some(Instant::now());
    }

    /// Check if the design has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// When the design was last written.
    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// Dirty, and quiet for at least the delay.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        self.last_change
            .is_none_or(|last| last.elapsed() >= self.delay)
    }

    /// Save the design if needed. Returns true if a save was performed.
    pub async fn maybe_save(&mut self, components: &[Component]) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }

        self.save(components).await?;
        Ok(true)
    }

    /// Save the design immediately.
    pub async fn save(&mut self, components: &[Component]) -> StorageResult<()> {
        self.storage.save(&self.key, components).await.inspect_err(|e| {
            log::error!("Auto-save to '{}' failed: {}", self.key, e);
        })?;

        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::info!("Saved {} component(s) to '{}'", components.len(), self.key);
        Ok(())
    }

    /// Load the stored design.
    pub async fn load(&mut self) -> StorageResult<Vec<Component>> {
        let components = self.storage.load(&self.key).await?;
        self.dirty = false;
        self.last_save = Some(Instant::now());
        log::info!("Loaded {} component(s) from '{}'", components.len(), self.key);
        Ok(components)
    }

    /// Try to restore the stored design.
    ///
    /// Returns None if nothing is stored. Stored data that fails validation
    /// is deleted so it cannot fail every later load.
    pub async fn load_last(&mut self) -> Option<Vec<Component>> {
        match self.load().await {
            Ok(components) => Some(components),
            Err(StorageError::NotFound(_)) => None,
            Err(e) => {
                log::error!("Discarding stored design '{}': {}", self.key, e);
                if let Err(e) = self.storage.delete(&self.key).await {
                    log::warn!("Failed to delete stored design '{}': {}", self.key, e);
                }
                None
            }
        }
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::MemoryStorage>> {
    Ok(Arc::new(crate::storage::MemoryStorage::new()))
}

/// Convenience type alias for platform-specific storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = crate::storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = crate::storage::MemoryStorage;

/// Type alias for the auto-save manager with platform-specific storage.
pub type PlatformAutoSaveManager = AutoSaveManager<PlatformStorage>;

/// Convenience function to create an auto-save manager with default storage.
pub fn create_autosave_manager(config: &EditorConfig) -> StorageResult<PlatformAutoSaveManager> {
    let storage = create_default_storage()?;
    Ok(AutoSaveManager::with_config(storage, config))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use crate::storage::{MemoryStorage, block_on};

    #[test]
    fn test_autosave_manager_creation() {
        let storage = Arc::new(MemoryStorage::new());
        let manager = AutoSaveManager::new(storage);

        assert!(!manager.is_dirty());
        assert!(!manager.should_save());
        assert_eq!(manager.delay(), Duration::from_secs(2));
        assert_eq!(manager.key(), DESIGN_KEY);
    }

    #[test]
    fn test_autosave_delay_from_config() {
        let config = EditorConfig {
            autosave_delay_ms: 250,
            ..EditorConfig::default()
        };
        let manager = AutoSaveManager::with_config(Arc::new(MemoryStorage::new()), &config);
        assert_eq!(manager.delay(), Duration::from_millis(250));
        assert_eq!(manager.delay(), config.autosave_delay());
    }

    #[test]
    fn test_autosave_waits_for_quiet_period() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage);
        manager.set_delay(Duration::from_secs(3600));

        manager.mark_dirty();
        assert!(manager.is_dirty());
        assert!(!manager.should_save());
        assert!(!block_on(manager.maybe_save(&[])).unwrap());

        manager.set_delay(Duration::ZERO);
        assert!(manager.should_save());
        assert!(block_on(manager.maybe_save(&[])).unwrap());
        assert!(!manager.is_dirty());
        assert!(manager.last_save().is_some());
    }

    #[test]
    fn test_autosave_load_last() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage);
        let components = vec![Component::new(ComponentKind::Section)];

        manager.mark_dirty();
        block_on(manager.save(&components)).unwrap();

        // A fresh manager on the same storage restores the design
        let mut restored = AutoSaveManager::new(manager.storage().clone());
        let loaded = block_on(restored.load_last()).expect("Should load last design");
        assert_eq!(loaded, components);
    }

    #[test]
    fn test_autosave_load_last_missing() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        assert!(block_on(manager.load_last()).is_none());
    }

    #[test]
    fn test_autosave_discards_corrupted_design() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_raw(DESIGN_KEY, "{\"components\": 3}").unwrap();
        let mut manager = AutoSaveManager::new(storage.clone());

        assert!(block_on(manager.load_last()).is_none());
        assert!(!block_on(storage.exists(DESIGN_KEY)).unwrap());
    }
}
