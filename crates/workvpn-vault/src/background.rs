// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run key derivation off the async executor.
//!
//! Derivation is deliberately slow, so async callers hand it to tokio's
//! blocking pool. A started task always runs to completion; if the awaiting
//! future is dropped, the task's key and any returned plaintext are still
//! zeroed when they go out of scope on the worker thread.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::task::{JoinError, spawn_blocking};
use workvpn_config::VaultConfig;
use workvpn_core::{EntropySource, VaultError};

use crate::kdf::Calibration;
use crate::plaintext::CredentialPlaintext;
use crate::record::VaultRecord;
use crate::vault::{CredentialVault, VaultParams};

fn join_error(e: JoinError) -> VaultError {
    VaultError::Internal(format!("key derivation task failed: {e}"))
}

/// [`CredentialVault::create`] on the blocking pool.
pub async fn create_in_background<E>(
    vault: Arc<CredentialVault<E>>,
    password: SecretString,
    plaintext: CredentialPlaintext,
) -> Result<VaultRecord, VaultError>
where
    E: EntropySource + 'static,
{
    spawn_blocking(move || vault.create(&password, &plaintext))
        .await
        .map_err(join_error)?
}

/// [`CredentialVault::open`] on the blocking pool.
pub async fn open_in_background<E>(
    vault: Arc<CredentialVault<E>>,
    password: SecretString,
    record: VaultRecord,
) -> Result<CredentialPlaintext, VaultError>
where
    E: EntropySource + 'static,
{
    spawn_blocking(move || vault.open(&password, &record))
        .await
        .map_err(join_error)?
}

/// [`VaultParams::calibrate`] on the blocking pool.
pub async fn calibrate_in_background(
    config: VaultConfig,
) -> Result<(VaultParams, Calibration), VaultError> {
    spawn_blocking(move || VaultParams::calibrate(&config))
        .await
        .map_err(join_error)?
}
