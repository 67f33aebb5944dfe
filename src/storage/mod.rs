//! Storage abstractions consumed by the gallery.
//!
//! Two stores back a gallery: a key-value store holding the serialized
//! manifest, and a blob store holding the photo contents themselves.
//! Both are traits so the platform-provided services can be swapped out;
//! this module ships a SQLite key-value store, an in-memory key-value store
//! and a directory-backed blob store.

pub mod fs;
pub mod memory;
pub mod sqlite;

use anyhow::Result;
use std::fmt;

pub use fs::FsBlobStore;
pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

/// Durable string storage keyed by name.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Storage scope for blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directory {
    /// Private application data; survives restarts.
    Data,
    /// Scratch space for transient captures.
    Cache,
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directory::Data => write!(f, "data"),
            Directory::Cache => write!(f, "cache"),
        }
    }
}

/// Result of a blob write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFileResult {
    /// Native URI of the written blob (`file://...`).
    pub uri: String,
}

/// Durable file storage. Contents cross this boundary as base64 text.
pub trait BlobStore: Send + Sync {
    /// Decode `data` (base64) and store it under `path` in `directory`
    fn write(&self, path: &str, data: &str, directory: Directory) -> Result<WriteFileResult>;

    /// Read a blob and return its contents base64-encoded.
    ///
    /// With a directory, `path` is relative to that directory. Without one,
    /// `path` must be absolute or a `file://` URI.
    fn read(&self, path: &str, directory: Option<Directory>) -> Result<String>;
}
