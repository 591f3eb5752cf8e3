// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the WorkVPN credential vault.

use thiserror::Error;

/// Generic text the application shows for every unlock failure.
pub const UNLOCK_FAILED_MESSAGE: &str = "could not unlock credentials";

/// The error type shared by every vault operation and capability trait.
///
/// None of the variants carry password, plaintext, or key bytes.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The platform CSPRNG could not be read. No partial output was produced.
    #[error("secure randomness unavailable")]
    EntropyUnavailable,

    /// Cost parameters fall outside the accepted band. When they come from a
    /// persisted record this is treated as tampering.
    #[error("invalid key derivation cost parameters: {0}")]
    InvalidCostParameters(String),

    /// The record was written by a format this build does not understand.
    #[error("unsupported vault record format version {0}")]
    UnsupportedFormatVersion(u8),

    /// Authentication failed. A wrong password and a modified record are
    /// deliberately indistinguishable.
    #[error("wrong password or tampered data")]
    WrongPasswordOrTamperedData,

    /// No record is stored under the requested id.
    #[error("no vault record stored under `{0}`")]
    NotFound(String),

    /// The persistence backend failed (I/O, permissions, ...).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Credential plaintext could not be serialized or deserialized.
    #[error("credential encoding error: {0}")]
    Encoding(String),

    /// Configuration errors (invalid values, inconsistent bands).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Wrap a backend error as [`VaultError::Storage`].
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// Whether this error belongs to the cryptographic unlock taxonomy.
    ///
    /// These failures are terminal for the operation and must never be
    /// retried automatically.
    pub fn is_unlock_failure(&self) -> bool {
        matches!(
            self,
            Self::EntropyUnavailable
                | Self::InvalidCostParameters(_)
                | Self::UnsupportedFormatVersion(_)
                | Self::WrongPasswordOrTamperedData
        )
    }

    /// Message suitable for end users.
    ///
    /// All unlock failures collapse into one generic message so the UI cannot
    /// act as an oracle for which check failed.
    pub fn user_message(&self) -> String {
        if self.is_unlock_failure() {
            UNLOCK_FAILED_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}
