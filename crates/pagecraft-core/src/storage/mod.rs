//! Storage abstraction for persistence.
//!
//! Backends store a design as the same JSON array used for import and
//! export, and validate it the same way on load.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{
    AutoSaveManager,
    DESIGN_KEY,
    PlatformAutoSaveManager,
    PlatformStorage,
    create_autosave_manager,
    create_default_storage,
};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::component::Component;
use crate::document::{ImportError, parse_components};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Design not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid stored design: {0}")]
    InvalidFormat(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<ImportError> for StorageError {
    fn from(error: ImportError) -> Self {
        match error {
            ImportError::Parse(e) => StorageError::Serialization(e.to_string()),
            ImportError::InvalidFormat(message) => StorageError::InvalidFormat(message),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Serialize a design for storage.
pub(crate) fn encode_components(components: &[Component]) -> StorageResult<String> {
    serde_json::to_string(components).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse and validate a stored design.
pub(crate) fn decode_components(json: &str) -> StorageResult<Vec<Component>> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(parse_components(value)?)
}

/// Trait for design storage backends.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save a design under a key.
    fn save(&self, key: &str, components: &[Component]) -> BoxFuture<'_, StorageResult<()>>;

    /// Load and validate a design.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Vec<Component>>>;

    /// Delete a design. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a design exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for design storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Save a design under a key.
    fn save(&self, key: &str, components: &[Component]) -> BoxFuture<'_, StorageResult<()>>;

    /// Load and validate a design.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Vec<Component>>>;

    /// Delete a design. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a design exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Simple blocking executor for tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
