// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the WorkVPN credential vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level WorkVPN vault configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkvpnConfig {
    /// Key derivation cost defaults and the accepted cost band.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Where sealed records are persisted when the file store is used.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Credential vault configuration.
///
/// `kdf_*` values are the Argon2id cost written into new records. The
/// `min_*`/`max_*` values form the band every record must fall inside before
/// any derivation work is done; a record outside it is treated as tampered.
/// Defaults follow OWASP recommendations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub kdf_memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,

    /// Lowest Argon2id memory cost a record may request, in KiB (default: 19456).
    #[serde(default = "default_min_memory_cost")]
    pub min_memory_cost: u32,

    /// Highest Argon2id memory cost a record may request, in KiB (default: 1 GiB).
    #[serde(default = "default_max_memory_cost")]
    pub max_memory_cost: u32,

    /// Lowest Argon2id iteration count a record may request (default: 2).
    #[serde(default = "default_min_iterations")]
    pub min_iterations: u32,

    /// Highest Argon2id iteration count a record may request (default: 64).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Highest Argon2id lane count a record may request (default: 16).
    #[serde(default = "default_max_parallelism")]
    pub max_parallelism: u32,

    /// Lowest PBKDF2 iteration count accepted from legacy records (default: 100000).
    #[serde(default = "default_legacy_min_iterations")]
    pub legacy_min_iterations: u32,

    /// Highest PBKDF2 iteration count accepted from legacy records (default: 10000000).
    #[serde(default = "default_legacy_max_iterations")]
    pub legacy_max_iterations: u32,

    /// Wall-clock target for one derivation when calibrating, in milliseconds (default: 100).
    #[serde(default = "default_calibration_target_ms")]
    pub calibration_target_ms: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_memory_cost: default_kdf_memory_cost(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
            min_memory_cost: default_min_memory_cost(),
            max_memory_cost: default_max_memory_cost(),
            min_iterations: default_min_iterations(),
            max_iterations: default_max_iterations(),
            max_parallelism: default_max_parallelism(),
            legacy_min_iterations: default_legacy_min_iterations(),
            legacy_max_iterations: default_legacy_max_iterations(),
            calibration_target_ms: default_calibration_target_ms(),
        }
    }
}

impl VaultConfig {
    /// `calibration_target_ms` as a [`Duration`].
    pub fn calibration_target(&self) -> Duration {
        Duration::from_millis(self.calibration_target_ms)
    }
}

fn default_kdf_memory_cost() -> u32 {
    65536 // 64 MiB per OWASP recommendation
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

fn default_min_memory_cost() -> u32 {
    19456 // OWASP floor for Argon2id with t=2
}

fn default_max_memory_cost() -> u32 {
    1_048_576
}

fn default_min_iterations() -> u32 {
    2
}

fn default_max_iterations() -> u32 {
    64
}

fn default_max_parallelism() -> u32 {
    16
}

fn default_legacy_min_iterations() -> u32 {
    100_000
}

fn default_legacy_max_iterations() -> u32 {
    10_000_000
}

fn default_calibration_target_ms() -> u64 {
    100
}

/// Storage configuration for the file-backed record store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding one sealed blob per record id.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
        }
    }
}

fn default_vault_dir() -> String {
    dirs::data_dir()
        .map(|d| d.join("workvpn/vault").display().to_string())
        .unwrap_or_else(|| "workvpn-vault".to_string())
}
