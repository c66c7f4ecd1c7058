//! Key-value storage medium.
//!
//! The composition store never touches a concrete storage backend directly.
//! It goes through [`KeyValueStore`], a string-to-string interface shaped
//! like the browser's `localStorage`, so the store can run against an
//! in-memory map in tests and a directory on disk from the CLI.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

/// A string key-value store scoped to a single storage partition.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;
}
