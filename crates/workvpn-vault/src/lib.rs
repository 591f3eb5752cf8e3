// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password-derived AES-256-GCM vault for WorkVPN connection secrets.
//!
//! Every record is sealed under a key derived from the user's password with
//! Argon2id and a per-record random salt. The record carries its own format
//! version, cost, salt and nonce, and the version/cost/salt header is bound
//! into the AEAD tag, so a record cannot be downgraded or modified without
//! [`open`](CredentialVault::open) failing.
//!
//! ```no_run
//! use secrecy::SecretString;
//! use workvpn_vault::{CredentialVault, VaultParams, VpnCredentials};
//!
//! # fn main() -> Result<(), workvpn_core::VaultError> {
//! let vault = CredentialVault::new(VaultParams::default());
//! let password = SecretString::from("correct-horse".to_string());
//!
//! let creds = VpnCredentials::new("office", "vpn.example.com", "alice", "s3cr3t");
//! let record = vault.create(&password, &creds.to_plaintext()?)?;
//! let blob = record.to_bytes();
//!
//! let opened = VpnCredentials::from_plaintext(&vault.open_blob(&password, &blob)?)?;
//! assert_eq!(opened, creds);
//! # Ok(())
//! # }
//! ```

pub mod background;
pub mod crypto;
pub mod file_store;
pub mod kdf;
pub mod migration;
pub mod plaintext;
pub mod record;
pub mod salt;
pub mod store;
pub mod vault;
pub mod verifier;

pub use background::{calibrate_in_background, create_in_background, open_in_background};
pub use file_store::FileStore;
pub use kdf::{Calibration, CostBounds, CostParameters, DerivedKey, KdfAlgorithm, KeyDerivationEngine};
pub use migration::{MigrationReport, migrate_records};
pub use plaintext::{CredentialPlaintext, VpnCredentials};
pub use record::{CURRENT_FORMAT_VERSION, FormatVersion, VaultRecord};
pub use salt::{Salt, SaltManager};
pub use store::CredentialStore;
pub use vault::{CredentialVault, VaultParams};
pub use verifier::{PasswordVerifier, is_legacy_hash};
