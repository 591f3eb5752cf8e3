// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keychain-style facade: a vault bound to a persistence target.

use secrecy::SecretString;
use tracing::{debug, info};
use workvpn_core::{EntropySource, OsEntropy, RecordId, SecureStore, VaultError};

use crate::plaintext::{CredentialPlaintext, VpnCredentials};
use crate::record::VaultRecord;
use crate::vault::CredentialVault;

/// Saves and loads sealed records by id through a [`SecureStore`].
///
/// Every write replaces the whole blob, so the store's atomic `store`
/// guarantees readers never see a half-written record.
pub struct CredentialStore<S, E = OsEntropy> {
    vault: CredentialVault<E>,
    store: S,
}

impl<S, E> std::fmt::Debug for CredentialStore<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl<S: SecureStore, E: EntropySource> CredentialStore<S, E> {
    pub fn new(vault: CredentialVault<E>, store: S) -> Self {
        Self { vault, store }
    }

    pub fn vault(&self) -> &CredentialVault<E> {
        &self.vault
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Seal `plaintext` and persist it under `id`, replacing any previous record.
    pub fn save(
        &self,
        id: &RecordId,
        password: &SecretString,
        plaintext: &CredentialPlaintext,
    ) -> Result<VaultRecord, VaultError> {
        let record = self.vault.create(password, plaintext)?;
        self.store.store(id, &record.to_bytes())?;
        debug!(id = %id, "credential saved");
        Ok(record)
    }

    pub fn save_credentials(
        &self,
        id: &RecordId,
        password: &SecretString,
        credentials: &VpnCredentials,
    ) -> Result<VaultRecord, VaultError> {
        self.save(id, password, &credentials.to_plaintext()?)
    }

    /// Fetch and parse the record under `id` without opening it.
    pub fn load_record(&self, id: &RecordId) -> Result<VaultRecord, VaultError> {
        VaultRecord::from_bytes(&self.store.load(id)?)
    }

    pub fn load(
        &self,
        id: &RecordId,
        password: &SecretString,
    ) -> Result<CredentialPlaintext, VaultError> {
        let record = self.load_record(id)?;
        self.vault.open(password, &record)
    }

    pub fn load_credentials(
        &self,
        id: &RecordId,
        password: &SecretString,
    ) -> Result<VpnCredentials, VaultError> {
        VpnCredentials::from_plaintext(&self.load(id, password)?)
    }

    /// Re-seal the record under `id` with a new password.
    pub fn update(
        &self,
        id: &RecordId,
        old_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<VaultRecord, VaultError> {
        let record = self.load_record(id)?;
        let rotated = self.vault.rotate(old_password, new_password, &record)?;
        self.store.store(id, &rotated.to_bytes())?;
        info!(id = %id, "credential password changed");
        Ok(rotated)
    }

    /// Migrate the record under `id` if it is outdated. Returns whether a
    /// new record was written.
    pub fn upgrade(&self, id: &RecordId, password: &SecretString) -> Result<bool, VaultError> {
        let record = self.load_record(id)?;
        if !self.vault.needs_upgrade(&record) {
            debug!(id = %id, "credential already current");
            return Ok(false);
        }
        let migrated = self.vault.change_format(password, &record)?;
        self.store.store(id, &migrated.to_bytes())?;
        info!(id = %id, from = %record.version(), "credential upgraded");
        Ok(true)
    }

    pub fn delete(&self, id: &RecordId) -> Result<(), VaultError> {
        self.store.delete(id)?;
        debug!(id = %id, "credential deleted");
        Ok(())
    }

    pub fn exists(&self, id: &RecordId) -> Result<bool, VaultError> {
        self.store.exists(id)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use workvpn_test_utils::{MemoryStore, fast_vault_config};

    use super::*;
    use crate::kdf::CostParameters;
    use crate::record::{CURRENT_FORMAT_VERSION, FormatVersion};

    fn store() -> CredentialStore<MemoryStore> {
        CredentialStore::new(
            CredentialVault::from_config(&fast_vault_config()).unwrap(),
            MemoryStore::new(),
        )
    }

    fn id(s: &str) -> RecordId {
        s.parse().unwrap()
    }

    fn pw(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn save_then_load() {
        let store = store();
        let creds = VpnCredentials::new("office", "vpn.example.com", "alice", "hunter2");

        store.save_credentials(&id("office"), &pw("master"), &creds).unwrap();

        assert!(store.exists(&id("office")).unwrap());
        assert_eq!(store.load_credentials(&id("office"), &pw("master")).unwrap(), creds);

        assert_eq!(store.store().len(), 1);
        let blob = store.store().get_raw(&id("office")).unwrap();
        assert!(!blob.windows(b"hunter2".len()).any(|w| w == b"hunter2"));
        assert_eq!(VaultRecord::from_bytes(&blob).unwrap().version(), CURRENT_FORMAT_VERSION);
    }

    #[test]
    fn missing_record_is_not_found() {
        let store = store();
        assert!(matches!(
            store.load(&id("nope"), &pw("x")),
            Err(VaultError::NotFound(_))
        ));
        assert!(!store.exists(&id("nope")).unwrap());
    }

    #[test]
    fn save_replaces_with_fresh_record() {
        let store = store();
        let first = store.save(&id("a"), &pw("pw"), &CredentialPlaintext::from("one")).unwrap();
        let second = store.save(&id("a"), &pw("pw"), &CredentialPlaintext::from("two")).unwrap();

        assert_ne!(first.salt(), second.salt());
        assert_eq!(store.load(&id("a"), &pw("pw")).unwrap().expose_secret(), b"two");
    }

    #[test]
    fn update_rotates_password() {
        let store = store();
        store.save(&id("a"), &pw("old"), &CredentialPlaintext::from("psk")).unwrap();

        store.update(&id("a"), &pw("old"), &pw("new")).unwrap();

        assert_eq!(store.load(&id("a"), &pw("new")).unwrap().expose_secret(), b"psk");
        assert!(matches!(
            store.load(&id("a"), &pw("old")),
            Err(VaultError::WrongPasswordOrTamperedData)
        ));
    }

    #[test]
    fn failed_update_keeps_previous_record() {
        let store = store();
        store.save(&id("a"), &pw("old"), &CredentialPlaintext::from("psk")).unwrap();

        assert!(store.update(&id("a"), &pw("wrong"), &pw("new")).is_err());

        store.store().set_fail_writes(true);
        assert!(matches!(
            store.update(&id("a"), &pw("old"), &pw("new")),
            Err(VaultError::Storage { .. })
        ));
        store.store().set_fail_writes(false);

        assert_eq!(store.load(&id("a"), &pw("old")).unwrap().expose_secret(), b"psk");
    }

    #[test]
    fn upgrade_migrates_legacy_record_once() {
        let store = store();
        let legacy = store
            .vault()
            .seal_with(
                FormatVersion::V1,
                CostParameters::pbkdf2(1_000),
                &pw("pw"),
                &CredentialPlaintext::from("legacy"),
            )
            .unwrap();
        store.store().put_raw(&id("old"), legacy.to_bytes());

        assert!(store.upgrade(&id("old"), &pw("pw")).unwrap());
        assert_eq!(store.load_record(&id("old")).unwrap().version(), CURRENT_FORMAT_VERSION);
        assert!(!store.upgrade(&id("old"), &pw("pw")).unwrap());
        assert_eq!(store.load(&id("old"), &pw("pw")).unwrap().expose_secret(), b"legacy");
    }

    #[test]
    fn delete_removes_record() {
        let store = store();
        store.save(&id("a"), &pw("pw"), &CredentialPlaintext::from("x")).unwrap();
        assert!(!store.store().is_empty());

        store.delete(&id("a")).unwrap();
        assert!(!store.exists(&id("a")).unwrap());
        assert!(store.store().is_empty());
        store.delete(&id("a")).unwrap();
    }
}
