// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! The tag is kept separate from the ciphertext so the record format can
//! store it as its own fixed-width field. [`open`] never returns bytes unless
//! the tag over ciphertext and associated data verified; ring's tag check is
//! constant-time.

use ring::aead::{AES_256_GCM, Aad, LessSafeKey, UnboundKey};
use secrecy::ExposeSecret;
use workvpn_core::{EntropySource, VaultError};
use zeroize::Zeroizing;

use crate::kdf::DerivedKey;

/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// A per-encryption nonce. Never reused under the same key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    /// Draw a fresh random nonce.
    pub fn generate(entropy: &impl EntropySource) -> Result<Self, VaultError> {
        let mut bytes = [0u8; NONCE_LEN];
        entropy.fill(&mut bytes)?;
        Ok(Self(bytes))
    }

    pub const fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for Nonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Nonce").field(&hex::encode(self.0)).finish()
    }
}

/// Output of [`seal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

fn aead_key(key: &DerivedKey) -> Result<LessSafeKey, VaultError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.expose_secret())
        .map_err(|_| VaultError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key` and `nonce`, authenticating `aad` alongside it.
///
/// The plaintext copy is zeroed if encryption fails.
pub fn seal(
    key: &DerivedKey,
    nonce: &Nonce,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Sealed, VaultError> {
    let key = aead_key(key)?;

    let mut in_out = Zeroizing::new(plaintext.to_vec());
    let tag = key
        .seal_in_place_separate_tag(
            ring::aead::Nonce::assume_unique_for_key(nonce.0),
            Aad::from(aad),
            in_out.as_mut_slice(),
        )
        .map_err(|_| VaultError::Internal("AES-256-GCM encryption failed".to_string()))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_ref());

    Ok(Sealed {
        ciphertext: std::mem::take(&mut *in_out),
        tag: tag_bytes,
    })
}

/// Verify and decrypt.
///
/// Any change to key, nonce, ciphertext, tag, or `aad` yields
/// [`VaultError::WrongPasswordOrTamperedData`] and no plaintext. The working
/// buffer is zeroed on drop whether or not verification passed.
pub fn open(
    key: &DerivedKey,
    nonce: &Nonce,
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    let key = aead_key(key)?;

    let mut in_out = Zeroizing::new(Vec::with_capacity(ciphertext.len() + TAG_LEN));
    in_out.extend_from_slice(ciphertext);
    in_out.extend_from_slice(tag);

    let plaintext_len = key
        .open_in_place(
            ring::aead::Nonce::assume_unique_for_key(nonce.0),
            Aad::from(aad),
            in_out.as_mut_slice(),
        )
        .map_err(|_| VaultError::WrongPasswordOrTamperedData)?
        .len();

    in_out.truncate(plaintext_len);
    Ok(in_out)
}
