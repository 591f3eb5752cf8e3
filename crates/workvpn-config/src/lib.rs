// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the WorkVPN credential vault.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use workvpn_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Argon2id memory: {} KiB", config.vault.kdf_memory_cost);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str, to_toml_string};
pub use model::{StorageConfig, VaultConfig, WorkvpnConfig};
pub use validation::{validate_config, validate_vault_config};

/// Load configuration from the XDG hierarchy and validate it.
///
/// On a Figment error the TOML sources are re-read so diagnostics can point
/// at the offending line.
pub fn load_and_validate() -> Result<WorkvpnConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(
                kdf_memory_cost = config.vault.kdf_memory_cost,
                kdf_iterations = config.vault.kdf_iterations,
                kdf_parallelism = config.vault.kdf_parallelism,
                "vault configuration loaded"
            );
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<WorkvpnConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = Vec::new();

    if let Ok(dir) = std::env::current_dir() {
        candidates.push(dir.join(loader::LOCAL_CONFIG_FILE));
    }
    if let Some(path) = loader::user_config_path() {
        candidates.push(path);
    }
    candidates.push(std::path::PathBuf::from(loader::SYSTEM_CONFIG_PATH));

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
