//! Preferences storage
//!
//! Small string values under flat keys:
//! - native: one file per key under the prefs directory (`local`)
//! - wasm: browser `localStorage` through the JS plugin (`browser`)
//! - tests / fallback: in-memory map
//!
//! Every backend is synchronous; `localStorage` never blocks.

#[cfg(target_arch = "wasm32")]
pub mod browser;
#[cfg(not(target_arch = "wasm32"))]
pub mod local;

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("invalid key '{0}' (use letters, digits, '.', '-', '_')")]
    InvalidKey(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("value for '{0}' is not valid UTF-8")]
    NotUtf8(String),
    /// Browser storage disabled or over quota
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(e.to_string()),
            _ => StorageError::Io(e.to_string()),
        }
    }
}

/// Keys double as file names on native, so keep them boring
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

pub trait PrefsBackend {
    /// `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    fn label(&self) -> &'static str;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPrefs {
    values: BTreeMap<String, String>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefsBackend for MemoryPrefs {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.values.remove(key);
        Ok(())
    }

    fn label(&self) -> &'static str {
        "memory"
    }
}

/// The platform's persistent backend
#[cfg(not(target_arch = "wasm32"))]
pub fn platform_prefs(dir: Option<&std::path::Path>) -> Box<dyn PrefsBackend> {
    match dir.map(std::path::Path::to_path_buf).or_else(local::FilePrefs::default_dir) {
        Some(dir) => Box::new(local::FilePrefs::with_base_dir(dir)),
        None => {
            log::warn!("no preferences directory available; settings won't persist");
            Box::new(MemoryPrefs::new())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn platform_prefs(_dir: Option<&std::path::Path>) -> Box<dyn PrefsBackend> {
    Box::new(browser::BrowserPrefs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validation() {
        assert!(validate_key("simview.log-window").is_ok());
        assert!(validate_key("a_b-c.d9").is_ok());
        for bad in ["", ".hidden", "../escape", "a/b", "white space", "ünï"] {
            assert_eq!(validate_key(bad), Err(StorageError::InvalidKey(bad.to_string())), "{}", bad);
        }
    }

    #[test]
    fn test_memory_backend() {
        let mut prefs = MemoryPrefs::new();
        assert_eq!(prefs.get("k").unwrap(), None);
        prefs.set("k", "v1").unwrap();
        prefs.set("k", "v2").unwrap();
        assert_eq!(prefs.get("k").unwrap().as_deref(), Some("v2"));
        prefs.remove("k").unwrap();
        prefs.remove("k").unwrap();
        assert_eq!(prefs.get("k").unwrap(), None);
        assert!(prefs.set("../k", "v").is_err());
    }
}
