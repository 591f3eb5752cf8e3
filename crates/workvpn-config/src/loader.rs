// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./workvpn.toml` > `~/.config/workvpn/workvpn.toml` > `/etc/workvpn/workvpn.toml`
//! with environment variable overrides via `WORKVPN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::diagnostic::ConfigError;
use crate::model::WorkvpnConfig;

/// Local config file name.
pub const LOCAL_CONFIG_FILE: &str = "workvpn.toml";

/// System-wide config path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/workvpn/workvpn.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/workvpn/workvpn.toml` (system-wide)
/// 3. `~/.config/workvpn/workvpn.toml` (user XDG config)
/// 4. `./workvpn.toml` (local directory)
/// 5. `WORKVPN_*` environment variables
pub fn load_config() -> Result<WorkvpnConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<WorkvpnConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WorkvpnConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WorkvpnConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WorkvpnConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WorkvpnConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// `~/.config/workvpn/workvpn.toml`, if the platform has a config dir.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("workvpn").join(LOCAL_CONFIG_FILE))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `WORKVPN_VAULT_KDF_MEMORY_COST` must map to
/// `vault.kdf_memory_cost`, not `vault.kdf.memory.cost`.
fn env_provider() -> Env {
    Env::prefixed("WORKVPN_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("vault_", "vault.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}

/// Render `config` as TOML, e.g. to persist a calibrated cost into
/// `workvpn.toml`.
pub fn to_toml_string(config: &WorkvpnConfig) -> Result<String, ConfigError> {
    toml::to_string_pretty(config).map_err(|e| ConfigError::Other(e.to_string()))
}
