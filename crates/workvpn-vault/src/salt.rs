// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-record random salts.
//!
//! A salt is drawn from the CSPRNG for every record written and persisted
//! inside that record. Salts are never derived from time, ids, or other
//! predictable inputs.

use workvpn_core::{EntropySource, OsEntropy, VaultError};

/// Salt length in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// A per-record key derivation salt.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    pub const fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Salt").field(&hex::encode(self.0)).finish()
    }
}

/// Draws fresh salts from an [`EntropySource`].
#[derive(Debug, Clone, Default)]
pub struct SaltManager<E = OsEntropy> {
    entropy: E,
}

impl SaltManager<OsEntropy> {
    /// Salt manager backed by the OS CSPRNG.
    pub fn new() -> Self {
        Self { entropy: OsEntropy }
    }
}

impl<E: EntropySource> SaltManager<E> {
    pub fn with_entropy(entropy: E) -> Self {
        Self { entropy }
    }

    pub(crate) fn entropy(&self) -> &E {
        &self.entropy
    }

    /// Generate a fresh random salt.
    ///
    /// Fails with [`VaultError::EntropyUnavailable`] if the CSPRNG cannot be
    /// read; no partially filled salt is ever returned.
    pub fn new_salt(&self) -> Result<Salt, VaultError> {
        let mut bytes = [0u8; SALT_LEN];
        self.entropy.fill(&mut bytes)?;
        Ok(Salt(bytes))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use workvpn_test_utils::FailingEntropy;

    use super::*;

    #[test]
    fn new_salt_produces_random_values() {
        let salts = SaltManager::new();
        let a = salts.new_salt().unwrap();
        let b = salts.new_salt().unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn salts_do_not_repeat() {
        let salts = SaltManager::new();
        let seen: HashSet<Salt> = (0..10_000).map(|_| salts.new_salt().unwrap()).collect();
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn entropy_failure_is_reported() {
        let salts = SaltManager::with_entropy(FailingEntropy);
        let err = salts.new_salt().unwrap_err();
        assert!(matches!(err, VaultError::EntropyUnavailable));
    }

    #[test]
    fn debug_shows_hex() {
        let salt = Salt::from_bytes([0xab; SALT_LEN]);
        assert_eq!(format!("{salt:?}"), format!("Salt(\"{}\")", "ab".repeat(SALT_LEN)));
    }
}
