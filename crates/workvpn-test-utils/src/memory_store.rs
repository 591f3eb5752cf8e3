// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory secure store fake.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use workvpn_core::{RecordId, SecureStore, VaultError};

/// A [`SecureStore`] backed by a `HashMap`.
///
/// Writes can be made to fail with [`set_fail_writes`](Self::set_fail_writes)
/// to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<RecordId, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw blob access for tamper tests.
    pub fn get_raw(&self, id: &RecordId) -> Option<Vec<u8>> {
        self.blobs.lock().ok()?.get(id).cloned()
    }

    /// Overwrite a blob without going through the failure toggle.
    pub fn put_raw(&self, id: &RecordId, blob: Vec<u8>) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(id.clone(), blob);
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<RecordId, Vec<u8>>>, VaultError> {
        self.blobs
            .lock()
            .map_err(|_| VaultError::Internal("memory store lock poisoned".to_string()))
    }
}

impl SecureStore for MemoryStore {
    fn store(&self, id: &RecordId, blob: &[u8]) -> Result<(), VaultError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(VaultError::storage(std::io::Error::other("simulated write failure")));
        }
        self.lock()?.insert(id.clone(), blob.to_vec());
        Ok(())
    }

    fn load(&self, id: &RecordId) -> Result<Vec<u8>, VaultError> {
        self.lock()?
            .get(id)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &RecordId) -> Result<(), VaultError> {
        self.lock()?.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RecordId {
        s.parse().unwrap()
    }

    #[test]
    fn store_load_delete() {
        let store = MemoryStore::new();
        store.store(&id("office"), b"blob").unwrap();

        assert_eq!(store.load(&id("office")).unwrap(), b"blob");
        assert!(store.exists(&id("office")).unwrap());

        store.delete(&id("office")).unwrap();
        assert!(matches!(store.load(&id("office")), Err(VaultError::NotFound(_))));
        assert!(!store.exists(&id("office")).unwrap());
    }

    #[test]
    fn failing_writes_leave_previous_value() {
        let store = MemoryStore::new();
        store.store(&id("a"), b"v1").unwrap();
        store.set_fail_writes(true);

        assert!(matches!(store.store(&id("a"), b"v2"), Err(VaultError::Storage { .. })));
        assert_eq!(store.load(&id("a")).unwrap(), b"v1");
    }
}
