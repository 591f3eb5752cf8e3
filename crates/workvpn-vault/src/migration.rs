// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch migration of stored records to the current format and cost.
//!
//! Run after an app update raises the cost defaults or introduces a new
//! format version. Each record is handled independently; a failure on one
//! does not stop the rest and is never retried.

use secrecy::SecretString;
use tracing::{info, warn};
use workvpn_core::{EntropySource, RecordId, SecureStore};

use crate::record::VaultRecord;
use crate::vault::CredentialVault;

/// What a migration run did.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Records re-sealed and written back.
    pub migrated: Vec<RecordId>,
    /// Records already at the current format and cost.
    pub skipped: Vec<RecordId>,
    /// Records that could not be migrated, with the reason.
    pub failed: Vec<(RecordId, String)>,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Upgrade every record in `ids` that [`CredentialVault::needs_upgrade`].
///
/// Failure reasons use [`VaultError::user_message`](workvpn_core::VaultError::user_message),
/// so unlock failures are reported generically.
pub fn migrate_records<S, E>(
    vault: &CredentialVault<E>,
    store: &S,
    ids: &[RecordId],
    password: &SecretString,
) -> MigrationReport
where
    S: SecureStore + ?Sized,
    E: EntropySource,
{
    let mut report = MigrationReport::default();

    for id in ids {
        let outcome = store
            .load(id)
            .and_then(|blob| VaultRecord::from_bytes(&blob))
            .and_then(|record| {
                if !vault.needs_upgrade(&record) {
                    return Ok(false);
                }
                let migrated = vault.change_format(password, &record)?;
                store.store(id, &migrated.to_bytes())?;
                Ok(true)
            });

        match outcome {
            Ok(true) => report.migrated.push(id.clone()),
            Ok(false) => report.skipped.push(id.clone()),
            Err(e) => {
                warn!(id = %id, error = %e, "record migration failed");
                report.failed.push((id.clone(), e.user_message()));
            }
        }
    }

    info!(
        migrated = report.migrated.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "record migration finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use workvpn_core::UNLOCK_FAILED_MESSAGE;
    use workvpn_test_utils::{MemoryStore, fast_vault_config};

    use super::*;
    use crate::kdf::CostParameters;
    use crate::plaintext::CredentialPlaintext;
    use crate::record::{CURRENT_FORMAT_VERSION, FormatVersion};

    fn id(s: &str) -> RecordId {
        s.parse().unwrap()
    }

    fn pw(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn migrates_legacy_and_skips_current() {
        let vault = CredentialVault::from_config(&fast_vault_config()).unwrap();
        let store = MemoryStore::new();
        let password = pw("master");

        let legacy = vault
            .seal_with(
                FormatVersion::V1,
                CostParameters::pbkdf2(2_000),
                &password,
                &CredentialPlaintext::from("legacy psk"),
            )
            .unwrap();
        store.store(&id("legacy"), &legacy.to_bytes()).unwrap();

        let current = vault.create(&password, &CredentialPlaintext::from("fresh")).unwrap();
        store.store(&id("current"), &current.to_bytes()).unwrap();

        let report = migrate_records(&vault, &store, &[id("legacy"), id("current")], &password);

        assert_eq!(report.migrated, vec![id("legacy")]);
        assert_eq!(report.skipped, vec![id("current")]);
        assert!(report.is_clean());

        let upgraded = VaultRecord::from_bytes(&store.load(&id("legacy")).unwrap()).unwrap();
        assert_eq!(upgraded.version(), CURRENT_FORMAT_VERSION);
        assert_eq!(vault.open(&password, &upgraded).unwrap().expose_secret(), b"legacy psk");
    }

    #[test]
    fn failures_are_collected_and_left_untouched() {
        let vault = CredentialVault::from_config(&fast_vault_config()).unwrap();
        let store = MemoryStore::new();

        let other = vault
            .seal_with(
                FormatVersion::V1,
                CostParameters::pbkdf2(1_000),
                &pw("someone else"),
                &CredentialPlaintext::from("x"),
            )
            .unwrap();
        store.store(&id("foreign"), &other.to_bytes()).unwrap();

        let report = migrate_records(&vault, &store, &[id("foreign"), id("missing")], &pw("master"));

        assert!(report.migrated.is_empty());
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0], (id("foreign"), UNLOCK_FAILED_MESSAGE.to_string()));
        assert_eq!(report.failed[1].0, id("missing"));

        let unchanged = VaultRecord::from_bytes(&store.load(&id("foreign")).unwrap()).unwrap();
        assert_eq!(unchanged, other);
    }

    #[test]
    fn write_failure_is_reported() {
        let vault = CredentialVault::from_config(&fast_vault_config()).unwrap();
        let store = MemoryStore::new();
        let legacy = vault
            .seal_with(
                FormatVersion::V1,
                CostParameters::pbkdf2(1_000),
                &pw("pw"),
                &CredentialPlaintext::from("x"),
            )
            .unwrap();
        store.store(&id("a"), &legacy.to_bytes()).unwrap();
        store.set_fail_writes(true);

        let report = migrate_records(&vault, &store, &[id("a")], &pw("pw"));
        assert_eq!(report.failed.len(), 1);
        assert!(!report.is_clean());
        assert!(matches!(
            VaultRecord::from_bytes(&store.load(&id("a")).unwrap()).map(|r| r.version()),
            Ok(FormatVersion::V1)
        ));
    }
}
