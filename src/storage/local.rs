//! File-backed preferences (native)
//!
//! One file per key under a base directory. Writes go through a temp file
//! and a rename so a crash mid-write leaves the old value.

use std::path::PathBuf;

use super::{validate_key, PrefsBackend, StorageError};

#[derive(Debug, Clone)]
pub struct FilePrefs {
    base_dir: PathBuf,
}

impl FilePrefs {
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// `<config dir>/simview`, e.g. `~/.config/simview`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("simview"))
    }

    pub fn base_dir(&self) -> &std::path::Path {
        &self.base_dir
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_dir.join(key))
    }
}

impl PrefsBackend for FilePrefs {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.resolve(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StorageError::NotUtf8(key.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        std::fs::create_dir_all(&self.base_dir)?;
        let tmp = self.base_dir.join(format!("{}.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    fn label(&self) -> &'static str {
        "file"
    }
}
