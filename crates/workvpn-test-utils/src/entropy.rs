// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entropy sources for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use workvpn_core::{EntropySource, OsEntropy, VaultError};

/// An entropy source whose platform RNG is always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEntropy;

impl EntropySource for FailingEntropy {
    fn fill(&self, _dest: &mut [u8]) -> Result<(), VaultError> {
        Err(VaultError::EntropyUnavailable)
    }
}

/// Delegates to the OS CSPRNG and counts draws.
///
/// With `fail_after` set, every draw past that many succeeds no longer,
/// which simulates the RNG failing partway through an operation.
#[derive(Debug, Default)]
pub struct CountingEntropy {
    calls: AtomicUsize,
    bytes: AtomicUsize,
    fail_after: Option<usize>,
}

impl CountingEntropy {
    pub fn failing_after(successful_draws: usize) -> Self {
        Self {
            fail_after: Some(successful_draws),
            ..Self::default()
        }
    }

    /// Number of `fill` calls, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Total bytes successfully drawn.
    pub fn bytes(&self) -> usize {
        self.bytes.load(Ordering::SeqCst)
    }
}

impl EntropySource for CountingEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), VaultError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| call >= limit) {
            return Err(VaultError::EntropyUnavailable);
        }
        OsEntropy.fill(dest)?;
        self.bytes.fetch_add(dest.len(), Ordering::SeqCst);
        Ok(())
    }
}
