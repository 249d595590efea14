//! Key-value persistence for the storefront client.
//!
//! Values are stored as JSON under string keys. [`Storage`] offers two
//! layers: the `try_*` methods return [`StorageError`], while `get`, `set`
//! and `remove` swallow failures (logging a warning) so that persistence
//! problems never break a user-facing flow.
//!
//! # Example
//!
//! ```rust
//! use storefront_cache::{MemoryBackend, Storage, StorageKeys};
//!
//! let storage = Storage::new(MemoryBackend::new());
//!
//! assert!(storage.set(StorageKeys::THEME, &"dark"));
//! let theme: Option<String> = storage.get(StorageKeys::THEME);
//! assert_eq!(theme.as_deref(), Some("dark"));
//!
//! let language: String = storage.get_or(StorageKeys::LANGUAGE, "en".to_string());
//! assert_eq!(language, "en");
//! ```

mod backend;
mod error;
mod keys;
mod kv;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use error::StorageError;
pub use keys::StorageKeys;
pub use kv::Storage;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        FileBackend, MemoryBackend, Storage, StorageBackend, StorageError, StorageKeys,
    };
}
