// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory-backed [`SecureStore`].
//!
//! One `<id>.vault` file per record. Writes go to a temp file in the same
//! directory, are synced, then renamed over the target, so a crash leaves
//! either the old blob or the new one.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use workvpn_config::StorageConfig;
use workvpn_core::{RecordId, SecureStore, VaultError};

const RECORD_EXTENSION: &str = "vault";

/// Stores sealed blobs as files under one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// On Unix the directory is restricted to the owner.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(VaultError::storage)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
                .map_err(VaultError::storage)?;
        }

        debug!(dir = %dir.display(), "file store opened");
        Ok(Self { dir })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, VaultError> {
        Self::open(&config.vault_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &RecordId) -> PathBuf {
        self.dir.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    /// Ids of every record in the directory, sorted.
    pub fn list(&self) -> Result<Vec<RecordId>, VaultError> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(VaultError::storage)? {
            let path = entry.map_err(VaultError::storage)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<RecordId>().ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl SecureStore for FileStore {
    fn store(&self, id: &RecordId, blob: &[u8]) -> Result<(), VaultError> {
        // NamedTempFile is created 0600 on Unix.
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(VaultError::storage)?;
        tmp.write_all(blob).map_err(VaultError::storage)?;
        tmp.as_file().sync_all().map_err(VaultError::storage)?;
        tmp.persist(self.path_for(id))
            .map_err(|e| VaultError::storage(e.error))?;

        debug!(id = %id, bytes = blob.len(), "record written");
        Ok(())
    }

    fn load(&self, id: &RecordId) -> Result<Vec<u8>, VaultError> {
        match std::fs::read(self.path_for(id)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(VaultError::NotFound(id.to_string()))
            }
            Err(e) => Err(VaultError::storage(e)),
        }
    }

    fn delete(&self, id: &RecordId) -> Result<(), VaultError> {
        match std::fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::storage(e)),
        }
    }

    fn exists(&self, id: &RecordId) -> Result<bool, VaultError> {
        Ok(self.path_for(id).is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RecordId {
        s.parse().unwrap()
    }

    #[test]
    fn store_load_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("vault")).unwrap();

        store.store(&id("office"), b"sealed").unwrap();
        assert_eq!(store.load(&id("office")).unwrap(), b"sealed");
        assert!(store.exists(&id("office")).unwrap());

        store.delete(&id("office")).unwrap();
        assert!(!store.exists(&id("office")).unwrap());
        assert!(matches!(store.load(&id("office")), Err(VaultError::NotFound(_))));
        store.delete(&id("office")).unwrap();
    }

    #[test]
    fn overwrite_replaces_whole_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.store(&id("a"), b"a much longer first blob").unwrap();
        store.store(&id("a"), b"short").unwrap();
        assert_eq!(store.load(&id("a")).unwrap(), b"short");
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.store(&id("a"), b"1").unwrap();
        store.store(&id("b"), b"2").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n.ends_with(".vault")));
    }

    #[test]
    fn list_returns_sorted_record_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.store(&id("zeta"), b"1").unwrap();
        store.store(&id("alpha"), b"2").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        assert_eq!(store.list().unwrap(), vec![id("alpha"), id("zeta")]);
    }

    #[test]
    fn from_config_uses_vault_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            vault_dir: dir.path().join("nested/vault").display().to_string(),
        };
        let store = FileStore::from_config(&config).unwrap();
        assert!(store.dir().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn files_and_directory_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("vault");
        let store = FileStore::open(&root).unwrap();
        store.store(&id("a"), b"secret").unwrap();

        let dir_mode = std::fs::metadata(&root).unwrap().permissions().mode();
        let file_mode = std::fs::metadata(root.join("a.vault")).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);
    }
}
