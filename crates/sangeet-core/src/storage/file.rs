use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

/// A storage partition kept in a directory, one `<key>.json` file per key.
///
/// Several handles may point at the same directory. Writes are whole-file
/// replacements with no locking, so the last writer wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (or create) a storage partition rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        log::debug!("Opened file storage at {}", dir.display());
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');

        if !valid {
            return Err(Error::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("partition");
        let storage = FileStorage::open(&dir).unwrap();
        assert!(storage.dir().is_dir());
    }

    #[test]
    fn test_round_trip_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::open(temp_dir.path()).unwrap();

        assert!(storage.get_item("saved_compositions").unwrap().is_none());
        storage.set_item("saved_compositions", "[]").unwrap();
        assert_eq!(
            storage.get_item("saved_compositions").unwrap().as_deref(),
            Some("[]")
        );
        assert!(temp_dir.path().join("saved_compositions.json").exists());

        storage.remove_item("saved_compositions").unwrap();
        storage.remove_item("saved_compositions").unwrap();
        assert!(storage.get_item("saved_compositions").unwrap().is_none());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::open(temp_dir.path()).unwrap();

        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                storage.set_item(key, "x"),
                Err(Error::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn test_handles_share_a_partition() {
        let temp_dir = TempDir::new().unwrap();
        let mut first = FileStorage::open(temp_dir.path()).unwrap();
        let mut second = FileStorage::open(temp_dir.path()).unwrap();

        first.set_item("k", "from-first").unwrap();
        second.set_item("k", "from-second").unwrap();
        assert_eq!(first.get_item("k").unwrap().as_deref(), Some("from-second"));
    }
}
