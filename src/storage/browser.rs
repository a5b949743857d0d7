//! Browser `localStorage` (wasm)
//!
//! The `sv_storage_*` functions are provided by the miniquad plugin in
//! `web/index.html`. Strings cross the boundary as (ptr, len) UTF-8.

use super::{validate_key, PrefsBackend, StorageError};

extern "C" {
    /// Byte length of the stored value, -1 if missing, -2 if storage is unavailable
    fn sv_storage_get_len(key_ptr: *const u8, key_len: usize) -> i32;
    fn sv_storage_copy(key_ptr: *const u8, key_len: usize, dest_ptr: *mut u8, max_len: usize) -> usize;
    /// 0 on success
    fn sv_storage_set(key_ptr: *const u8, key_len: usize, val_ptr: *const u8, val_len: usize) -> i32;
    fn sv_storage_remove(key_ptr: *const u8, key_len: usize);
}

const MISSING: i32 = -1;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserPrefs;

impl PrefsBackend for BrowserPrefs {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let len = unsafe { sv_storage_get_len(key.as_ptr(), key.len()) };
        if len == MISSING {
            return Ok(None);
        }
        if len < 0 {
            return Err(StorageError::Unavailable("localStorage is disabled".to_string()));
        }

        let mut buffer = vec![0u8; len as usize];
        let copied = unsafe { sv_storage_copy(key.as_ptr(), key.len(), buffer.as_mut_ptr(), buffer.len()) };
        buffer.truncate(copied);
        String::from_utf8(buffer)
            .map(Some)
            .map_err(|_| StorageError::NotUtf8(key.to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let status = unsafe { sv_storage_set(key.as_ptr(), key.len(), value.as_ptr(), value.len()) };
        if status == 0 {
            Ok(())
        } else {
            Err(StorageError::Unavailable(format!("localStorage write failed ({})", status)))
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        unsafe { sv_storage_remove(key.as_ptr(), key.len()) };
        Ok(())
    }

    fn label(&self) -> &'static str {
        "localStorage"
    }
}
