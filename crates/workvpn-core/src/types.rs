// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the WorkVPN vault crates.

use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Maximum length of a record id.
pub const MAX_RECORD_ID_LEN: usize = 128;

/// Identifier of a persisted vault record (e.g. `profile.office.password`).
///
/// Restricted to `[A-Za-z0-9._-]` so ids map safely onto file names and
/// keychain account names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Validate and wrap a record id.
    pub fn new(id: impl Into<String>) -> Result<Self, VaultError> {
        let id = id.into();
        if id.is_empty() || id.len() > MAX_RECORD_ID_LEN {
            return Err(VaultError::Config(format!(
                "record id must be 1..={MAX_RECORD_ID_LEN} characters"
            )));
        }
        if id == "." || id == ".." {
            return Err(VaultError::Config(format!("record id `{id}` is reserved")));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(VaultError::Config(format!(
                "record id `{id}` contains characters outside [A-Za-z0-9._-]"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RecordId {
    type Error = VaultError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl std::str::FromStr for RecordId {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
