// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source of security-grade randomness for salts and nonces.

use ring::rand::{SecureRandom, SystemRandom};

use crate::error::VaultError;

/// A CSPRNG the vault draws salts and nonces from.
///
/// Implementations must fail rather than return predictable bytes.
pub trait EntropySource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<(), VaultError>;
}

/// The operating system CSPRNG, via ring's [`SystemRandom`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), VaultError> {
        SystemRandom::new()
            .fill(dest)
            .map_err(|_| VaultError::EntropyUnavailable)
    }
}

impl<T: EntropySource + ?Sized> EntropySource for &T {
    fn fill(&self, dest: &mut [u8]) -> Result<(), VaultError> {
        (**self).fill(dest)
    }
}

impl<T: EntropySource + ?Sized> EntropySource for std::sync::Arc<T> {
    fn fill(&self, dest: &mut [u8]) -> Result<(), VaultError> {
        (**self).fill(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_entropy_fills_whole_buffer() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        OsEntropy.fill(&mut a).unwrap();
        OsEntropy.fill(&mut b).unwrap();

        assert_ne!(a, [0u8; 32]);
        assert_ne!(a, b);
    }
}
