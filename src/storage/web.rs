//! Browser storage backend
//!
//! Keeps each key in the page's `localStorage` (namespaced `drape.<key>` by
//! the JS side in web/index.html), so presets and clips survive a reload.
//! Also hosts the download bridge used to export clips from the browser.

use super::{check_key, KeyValueStore, StorageError};

// FFI bindings to the drape plugin registered in web/index.html

extern "C" {
    fn drape_storage_available() -> i32;
    /// Byte length of the stored value, or -1 when the key is absent
    fn drape_storage_value_len(key_ptr: *const u8, key_len: usize) -> i32;
    fn drape_storage_copy_value(key_ptr: *const u8, key_len: usize, dest_ptr: *mut u8, max_len: usize) -> usize;
    /// 0 on success, 1 when the browser refused the write (quota)
    fn drape_storage_set(key_ptr: *const u8, key_len: usize, value_ptr: *const u8, value_len: usize) -> i32;

    fn drape_set_export_data(ptr: *const u8, len: usize);
    fn drape_set_export_filename(ptr: *const u8, len: usize);
    fn drape_trigger_download();
}

const SET_OK: i32 = 0;

#[derive(Debug, Clone, Default)]
pub struct WebStore;

impl WebStore {
    /// None when the page has no usable localStorage (private mode, blocked)
    pub fn open() -> Option<Self> {
        (unsafe { drape_storage_available() } != 0).then_some(WebStore)
    }
}

impl KeyValueStore for WebStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        let len = unsafe { drape_storage_value_len(key.as_ptr(), key.len()) };
        if len < 0 {
            return Ok(None);
        }

        let mut buf = vec![0u8; len as usize];
        let copied = unsafe { drape_storage_copy_value(key.as_ptr(), key.len(), buf.as_mut_ptr(), buf.len()) };
        buf.truncate(copied);
        String::from_utf8(buf)
            .map(Some)
            .map_err(|e| StorageError::Serde(format!("'{}' is not UTF-8: {}", key, e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let status = unsafe { drape_storage_set(key.as_ptr(), key.len(), value.as_ptr(), value.len()) };
        if status == SET_OK {
            Ok(())
        } else {
            Err(StorageError::PermissionDenied(format!(
                "browser storage refused '{}' ({} bytes)",
                key,
                value.len()
            )))
        }
    }
}

/// Hand a file to the browser as a download
pub fn trigger_download(file_name: &str, bytes: &[u8]) {
    unsafe {
        drape_set_export_data(bytes.as_ptr(), bytes.len());
        drape_set_export_filename(file_name.as_ptr(), file_name.len());
        drape_trigger_download();
    }
}
