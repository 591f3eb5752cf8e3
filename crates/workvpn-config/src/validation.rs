// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the semantic constraints serde cannot express: the default cost
//! must sit inside the accepted band, the band must be ordered, and Argon2id
//! needs at least 8 KiB of memory per lane.

use crate::diagnostic::ConfigError;
use crate::model::{VaultConfig, WorkvpnConfig};

/// Argon2id's own floor: 8 KiB of memory per lane.
pub const ARGON2_MIN_MEMORY_PER_LANE: u32 = 8;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &WorkvpnConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    check_vault(&config.vault, &mut errors);

    if config.storage.vault_dir.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.vault_dir must not be empty",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate only the `[vault]` section.
///
/// Used when a vault is built from an in-memory [`VaultConfig`] rather than a
/// loaded file.
pub fn validate_vault_config(vault: &VaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    check_vault(vault, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_vault(vault: &VaultConfig, errors: &mut Vec<ConfigError>) {
    if vault.min_memory_cost > vault.max_memory_cost {
        errors.push(ConfigError::validation(format!(
            "vault.min_memory_cost ({}) must not exceed vault.max_memory_cost ({})",
            vault.min_memory_cost, vault.max_memory_cost
        )));
    }

    if vault.min_iterations == 0 {
        errors.push(ConfigError::validation(
            "vault.min_iterations must be at least 1",
        ));
    }

    if vault.min_iterations > vault.max_iterations {
        errors.push(ConfigError::validation(format!(
            "vault.min_iterations ({}) must not exceed vault.max_iterations ({})",
            vault.min_iterations, vault.max_iterations
        )));
    }

    if vault.max_parallelism == 0 {
        errors.push(ConfigError::validation(
            "vault.max_parallelism must be at least 1",
        ));
    }

    if !(vault.min_memory_cost..=vault.max_memory_cost).contains(&vault.kdf_memory_cost) {
        errors.push(ConfigError::validation(format!(
            "vault.kdf_memory_cost must be within {}..={} KiB, got {}",
            vault.min_memory_cost, vault.max_memory_cost, vault.kdf_memory_cost
        )));
    }

    if !(vault.min_iterations..=vault.max_iterations).contains(&vault.kdf_iterations) {
        errors.push(ConfigError::validation(format!(
            "vault.kdf_iterations must be within {}..={}, got {}",
            vault.min_iterations, vault.max_iterations, vault.kdf_iterations
        )));
    }

    if vault.kdf_parallelism == 0 || vault.kdf_parallelism > vault.max_parallelism {
        errors.push(ConfigError::validation(format!(
            "vault.kdf_parallelism must be within 1..={}, got {}",
            vault.max_parallelism, vault.kdf_parallelism
        )));
    }

    if vault.kdf_memory_cost < ARGON2_MIN_MEMORY_PER_LANE.saturating_mul(vault.kdf_parallelism) {
        errors.push(ConfigError::validation(format!(
            "vault.kdf_memory_cost must be at least {ARGON2_MIN_MEMORY_PER_LANE} KiB per lane ({} lanes), got {}",
            vault.kdf_parallelism, vault.kdf_memory_cost
        )));
    }

    if vault.legacy_min_iterations == 0 {
        errors.push(ConfigError::validation(
            "vault.legacy_min_iterations must be at least 1",
        ));
    }

    if vault.legacy_min_iterations > vault.legacy_max_iterations {
        errors.push(ConfigError::validation(format!(
            "vault.legacy_min_iterations ({}) must not exceed vault.legacy_max_iterations ({})",
            vault.legacy_min_iterations, vault.legacy_max_iterations
        )));
    }

    if vault.calibration_target_ms == 0 {
        errors.push(ConfigError::validation(
            "vault.calibration_target_ms must be greater than 0",
        ));
    }
}
