// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence capability for sealed vault records.

use crate::error::VaultError;
use crate::types::RecordId;

/// Byte-blob persistence target (platform keychain, file, or similar).
///
/// The vault never interprets storage beyond this interface. Implementations
/// must make `store` atomic: a reader observes either the previous blob or
/// the new one, never a partial write.
pub trait SecureStore: Send + Sync {
    /// Persist `blob` under `id`, replacing any previous value.
    fn store(&self, id: &RecordId, blob: &[u8]) -> Result<(), VaultError>;

    /// Load the blob stored under `id`, or [`VaultError::NotFound`].
    fn load(&self, id: &RecordId) -> Result<Vec<u8>, VaultError>;

    /// Remove the blob stored under `id`. Removing a missing id succeeds.
    fn delete(&self, id: &RecordId) -> Result<(), VaultError>;

    /// Whether a blob is stored under `id`.
    fn exists(&self, id: &RecordId) -> Result<bool, VaultError> {
        match self.load(id) {
            Ok(_) => Ok(true),
            Err(VaultError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
