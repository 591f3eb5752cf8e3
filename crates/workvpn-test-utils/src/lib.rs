// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for WorkVPN vault tests.
//!
//! Provides in-memory fakes for the vault's capabilities so tests run fast
//! and deterministically without touching the keychain or filesystem.
//!
//! # Components
//!
//! - [`MemoryStore`] - in-memory [`SecureStore`](workvpn_core::SecureStore)
//! - [`FailingEntropy`] / [`CountingEntropy`] - entropy sources for failure and accounting tests
//! - [`fast_vault_config`] - a cost band cheap enough for thousands of derivations

pub mod entropy;
pub mod memory_store;

pub use entropy::{CountingEntropy, FailingEntropy};
pub use memory_store::MemoryStore;

use workvpn_config::VaultConfig;

/// Vault configuration with the smallest Argon2id cost the band allows.
///
/// Only for tests: 8 KiB and 2 passes derive in well under a millisecond.
pub fn fast_vault_config() -> VaultConfig {
    VaultConfig {
        kdf_memory_cost: 8,
        kdf_iterations: 2,
        kdf_parallelism: 1,
        min_memory_cost: 8,
        max_memory_cost: 64,
        min_iterations: 2,
        max_iterations: 8,
        max_parallelism: 2,
        legacy_min_iterations: 1_000,
        legacy_max_iterations: 100_000,
        calibration_target_ms: 1,
    }
}
