// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record lifecycle: create, open, rotate, and format migration.
//!
//! Each record carries its own salt, cost, and nonce. A fresh key is derived
//! for every operation and dropped (zeroed) before the call returns; the
//! vault itself holds only parameters and an entropy source, so it can be
//! shared freely between threads.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use workvpn_config::{VaultConfig, validate_vault_config};
use workvpn_core::{EntropySource, OsEntropy, VaultError};

use crate::crypto::{self, Nonce};
use crate::kdf::{Calibration, CostBounds, CostParameters, KdfAlgorithm, KeyDerivationEngine};
use crate::plaintext::CredentialPlaintext;
use crate::record::{self, CURRENT_FORMAT_VERSION, FormatVersion, MAX_CIPHERTEXT_LEN, VaultRecord};
use crate::salt::SaltManager;

/// Cost written into new records and the band accepted when opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultParams {
    pub cost: CostParameters,
    pub bounds: CostBounds,
}

impl VaultParams {
    /// Build parameters from a `[vault]` config section, validating it first.
    pub fn from_config(config: &VaultConfig) -> Result<Self, VaultError> {
        validate_vault_config(config).map_err(|errors| {
            VaultError::Config(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        Ok(Self {
            cost: CostParameters::from_config(config),
            bounds: CostBounds::from_config(config),
        })
    }

    /// Replace the creation cost with a calibrated one.
    ///
    /// The calibrated cost must still sit inside the band.
    pub fn with_calibration(self, calibration: &Calibration) -> Result<Self, VaultError> {
        self.bounds.check(KdfAlgorithm::Argon2id, &calibration.cost)?;
        Ok(Self {
            cost: calibration.cost,
            ..self
        })
    }

    /// Validate `config`, calibrate toward its `calibration_target_ms`, and
    /// use the result as the creation cost.
    ///
    /// The [`Calibration`] is returned too so the caller can persist it with
    /// [`Calibration::apply_to`].
    pub fn calibrate(config: &VaultConfig) -> Result<(Self, Calibration), VaultError> {
        let params = Self::from_config(config)?;
        let calibration = KeyDerivationEngine::new(params.bounds).calibrate_from_config(config)?;
        info!(
            iterations = calibration.cost.iterations,
            memory_kib = calibration.cost.memory_kib,
            elapsed_ms = calibration.elapsed.as_millis() as u64,
            target_ms = config.calibration_target_ms,
            target_met = calibration.target_met,
            "calibrated key derivation cost"
        );
        Ok((params.with_calibration(&calibration)?, calibration))
    }
}

impl Default for VaultParams {
    fn default() -> Self {
        let config = VaultConfig::default();
        Self {
            cost: CostParameters::from_config(&config),
            bounds: CostBounds::from_config(&config),
        }
    }
}

/// Seals and opens credential records.
#[derive(Debug)]
pub struct CredentialVault<E = OsEntropy> {
    params: VaultParams,
    engine: KeyDerivationEngine,
    salts: SaltManager<E>,
}

impl CredentialVault<OsEntropy> {
    pub fn new(params: VaultParams) -> Self {
        Self::with_entropy(params, OsEntropy)
    }

    pub fn from_config(config: &VaultConfig) -> Result<Self, VaultError> {
        Ok(Self::new(VaultParams::from_config(config)?))
    }
}

impl<E: EntropySource> CredentialVault<E> {
    pub fn with_entropy(params: VaultParams, entropy: E) -> Self {
        Self {
            params,
            engine: KeyDerivationEngine::new(params.bounds),
            salts: SaltManager::with_entropy(entropy),
        }
    }

    pub fn params(&self) -> &VaultParams {
        &self.params
    }

    pub fn engine(&self) -> &KeyDerivationEngine {
        &self.engine
    }

    /// Seal `plaintext` into a new current-version record.
    ///
    /// Salt and nonce are drawn before any derivation work, so an entropy
    /// failure aborts without producing output.
    pub fn create(
        &self,
        password: &SecretString,
        plaintext: &CredentialPlaintext,
    ) -> Result<VaultRecord, VaultError> {
        self.seal_with(CURRENT_FORMAT_VERSION, self.params.cost, password, plaintext)
    }

    pub(crate) fn seal_with(
        &self,
        version: FormatVersion,
        cost: CostParameters,
        password: &SecretString,
        plaintext: &CredentialPlaintext,
    ) -> Result<VaultRecord, VaultError> {
        if plaintext.len() > MAX_CIPHERTEXT_LEN {
            return Err(VaultError::Encoding(format!(
                "credential payload of {} bytes exceeds the {MAX_CIPHERTEXT_LEN} byte limit",
                plaintext.len()
            )));
        }

        let salt = self.salts.new_salt()?;
        let nonce = Nonce::generate(self.salts.entropy())?;

        let key = self.engine.derive(
            version.kdf(),
            password.expose_secret().as_bytes(),
            &salt,
            &cost,
        )?;
        let aad = record::associated_data(version, &cost, &salt);
        let sealed = crypto::seal(&key, &nonce, plaintext.expose_secret(), &aad)?;

        debug!(
            %version,
            iterations = cost.iterations,
            memory_kib = cost.memory_kib,
            parallelism = cost.parallelism,
            "record sealed"
        );
        Ok(VaultRecord::new(
            version,
            cost,
            salt,
            nonce,
            sealed.ciphertext,
            sealed.tag,
        ))
    }

    /// Open `record` with `password`.
    ///
    /// The record's own cost is checked against the band before derivation.
    /// A wrong password and a modified record both yield
    /// [`VaultError::WrongPasswordOrTamperedData`].
    pub fn open(
        &self,
        password: &SecretString,
        record: &VaultRecord,
    ) -> Result<CredentialPlaintext, VaultError> {
        let key = self.engine.derive(
            record.version().kdf(),
            password.expose_secret().as_bytes(),
            record.salt(),
            record.cost(),
        )?;
        let plaintext = crypto::open(
            &key,
            record.nonce(),
            record.ciphertext(),
            record.tag(),
            &record.associated_data(),
        )?;

        debug!(version = %record.version(), "record opened");
        Ok(CredentialPlaintext::from(plaintext))
    }

    /// Parse and open a persisted blob.
    pub fn open_blob(
        &self,
        password: &SecretString,
        blob: &[u8],
    ) -> Result<CredentialPlaintext, VaultError> {
        self.open(password, &VaultRecord::from_bytes(blob)?)
    }

    /// Re-seal under `new_password` with a fresh salt and nonce.
    pub fn rotate(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
        record: &VaultRecord,
    ) -> Result<VaultRecord, VaultError> {
        let plaintext = self.open(old_password, record)?;
        let rotated = self.create(new_password, &plaintext)?;
        info!("record password rotated");
        Ok(rotated)
    }

    /// Migrate `record` to the current format and cost defaults.
    pub fn change_format(
        &self,
        password: &SecretString,
        record: &VaultRecord,
    ) -> Result<VaultRecord, VaultError> {
        let plaintext = self.open(password, record)?;
        let migrated = self.create(password, &plaintext)?;
        info!(
            from = %record.version(),
            to = %migrated.version(),
            "record format migrated"
        );
        Ok(migrated)
    }

    /// Whether `record` predates the current format or uses a weaker cost
    /// than new records would get.
    pub fn needs_upgrade(&self, record: &VaultRecord) -> bool {
        record.version() != CURRENT_FORMAT_VERSION
            || record.cost().is_weaker_than(&self.params.cost)
    }

    /// Serialize `value` as JSON and seal it.
    pub fn create_json<T: Serialize>(
        &self,
        password: &SecretString,
        value: &T,
    ) -> Result<VaultRecord, VaultError> {
        self.create(password, &CredentialPlaintext::from_json(value)?)
    }

    /// Open `record` and deserialize its payload as JSON.
    pub fn open_json<T: DeserializeOwned>(
        &self,
        password: &SecretString,
        record: &VaultRecord,
    ) -> Result<T, VaultError> {
        self.open(password, record)?.to_json()
    }
}
