// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the WorkVPN credential vault.
//!
//! This crate provides the error taxonomy and the two capabilities the vault
//! depends on: a byte-blob [`SecureStore`] and a CSPRNG [`EntropySource`].

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{UNLOCK_FAILED_MESSAGE, VaultError};
pub use types::RecordId;

pub use traits::{EntropySource, OsEntropy, SecureStore};
