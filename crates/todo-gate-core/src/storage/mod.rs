/*
[INPUT]:  String keys and serialized string values
[OUTPUT]: Durable key/value storage abstraction and its backends
[POS]:    Storage layer - local-storage style persistence boundary
[UPDATE]: When adding storage backends or changing key semantics
*/

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Synchronous string key/value store.
///
/// Values are written wholesale; there is no partial update.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}
