// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned, self-describing record container.
//!
//! Layout (big-endian):
//!
//! ```text
//! version       u8
//! iterations    u32
//! memory_kib    u32
//! parallelism   u32
//! salt          [u8; 16]
//! nonce         [u8; 12]
//! ciphertext    u32 length prefix + bytes
//! tag           [u8; 16]
//! ```
//!
//! Version, cost and salt form the AEAD associated data, so changing any of
//! them invalidates the tag.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use workvpn_core::VaultError;

use crate::crypto::{NONCE_LEN, Nonce, TAG_LEN};
use crate::kdf::{CostParameters, KdfAlgorithm};
use crate::salt::{SALT_LEN, Salt};

/// Byte offset of the cost structure.
pub const COST_OFFSET: usize = 1;
const SALT_OFFSET: usize = COST_OFFSET + CostParameters::ENCODED_LEN;
const NONCE_OFFSET: usize = SALT_OFFSET + SALT_LEN;
const LEN_OFFSET: usize = NONCE_OFFSET + NONCE_LEN;

/// Length of the associated data (version, cost, salt).
pub const ASSOCIATED_DATA_LEN: usize = NONCE_OFFSET;

/// Bytes before the ciphertext.
pub const HEADER_LEN: usize = LEN_OFFSET + 4;

/// Largest ciphertext a record may carry.
pub const MAX_CIPHERTEXT_LEN: usize = 1024 * 1024;

/// Record format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FormatVersion {
    /// PBKDF2-HMAC-SHA256 + AES-256-GCM. Read-only; migrated on sight.
    V1 = 1,
    /// Argon2id + AES-256-GCM.
    V2 = 2,
}

/// Version written by [`CredentialVault::create`](crate::CredentialVault::create).
pub const CURRENT_FORMAT_VERSION: FormatVersion = FormatVersion::V2;

impl FormatVersion {
    pub fn from_byte(byte: u8) -> Result<Self, VaultError> {
        match byte {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(VaultError::UnsupportedFormatVersion(other)),
        }
    }

    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// The key derivation function records of this version use.
    pub const fn kdf(self) -> KdfAlgorithm {
        match self {
            Self::V1 => KdfAlgorithm::Pbkdf2HmacSha256,
            Self::V2 => KdfAlgorithm::Argon2id,
        }
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.as_byte())
    }
}

/// Associated data binding version, cost and salt to a ciphertext.
pub fn associated_data(
    version: FormatVersion,
    cost: &CostParameters,
    salt: &Salt,
) -> [u8; ASSOCIATED_DATA_LEN] {
    let mut aad = [0u8; ASSOCIATED_DATA_LEN];
    aad[0] = version.as_byte();
    aad[COST_OFFSET..SALT_OFFSET].copy_from_slice(&cost.to_bytes());
    aad[SALT_OFFSET..NONCE_OFFSET].copy_from_slice(salt.as_bytes());
    aad
}

/// One sealed credential. Immutable; updates produce a new record.
#[derive(Clone, PartialEq, Eq)]
pub struct VaultRecord {
    version: FormatVersion,
    cost: CostParameters,
    salt: Salt,
    nonce: Nonce,
    ciphertext: Vec<u8>,
    tag: [u8; TAG_LEN],
}

impl VaultRecord {
    pub(crate) fn new(
        version: FormatVersion,
        cost: CostParameters,
        salt: Salt,
        nonce: Nonce,
        ciphertext: Vec<u8>,
        tag: [u8; TAG_LEN],
    ) -> Self {
        Self {
            version,
            cost,
            salt,
            nonce,
            ciphertext,
            tag,
        }
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn cost(&self) -> &CostParameters {
        &self.cost
    }

    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn tag(&self) -> &[u8; TAG_LEN] {
        &self.tag
    }

    pub fn associated_data(&self) -> [u8; ASSOCIATED_DATA_LEN] {
        associated_data(self.version, &self.cost, &self.salt)
    }

    /// Length of [`to_bytes`](Self::to_bytes) output.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.ciphertext.len() + TAG_LEN
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.associated_data());
        out.extend_from_slice(self.nonce.as_bytes());
        // Bounded by MAX_CIPHERTEXT_LEN at construction.
        out.extend_from_slice(&(self.ciphertext.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Parse a blob produced by [`to_bytes`](Self::to_bytes).
    ///
    /// An unknown leading byte is [`VaultError::UnsupportedFormatVersion`].
    /// Every other structural defect is reported as
    /// [`VaultError::WrongPasswordOrTamperedData`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VaultError> {
        let Some(&version_byte) = bytes.first() else {
            return Err(VaultError::WrongPasswordOrTamperedData);
        };
        let version = FormatVersion::from_byte(version_byte)?;

        if bytes.len() < HEADER_LEN + TAG_LEN {
            return Err(VaultError::WrongPasswordOrTamperedData);
        }

        let cost = CostParameters::from_bytes(&fixed(&bytes[COST_OFFSET..SALT_OFFSET])?);
        let salt = Salt::from_bytes(fixed(&bytes[SALT_OFFSET..NONCE_OFFSET])?);
        let nonce = Nonce::from_bytes(fixed(&bytes[NONCE_OFFSET..LEN_OFFSET])?);
        let ciphertext_len = u32::from_be_bytes(fixed(&bytes[LEN_OFFSET..HEADER_LEN])?) as usize;

        if ciphertext_len > MAX_CIPHERTEXT_LEN
            || bytes.len() != HEADER_LEN + ciphertext_len + TAG_LEN
        {
            return Err(VaultError::WrongPasswordOrTamperedData);
        }

        let ciphertext_end = HEADER_LEN + ciphertext_len;
        Ok(Self {
            version,
            cost,
            salt,
            nonce,
            ciphertext: bytes[HEADER_LEN..ciphertext_end].to_vec(),
            tag: fixed(&bytes[ciphertext_end..])?,
        })
    }

    /// Standard base64 of [`to_bytes`](Self::to_bytes), for stores that only
    /// hold text.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    pub fn from_base64(encoded: &str) -> Result<Self, VaultError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| VaultError::WrongPasswordOrTamperedData)?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for VaultRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultRecord")
            .field("version", &self.version)
            .field("cost", &self.cost)
            .field("salt", &self.salt)
            .field("nonce", &self.nonce)
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], VaultError> {
    bytes
        .try_into()
        .map_err(|_| VaultError::WrongPasswordOrTamperedData)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VaultRecord {
        VaultRecord::new(
            FormatVersion::V2,
            CostParameters::argon2id(65536, 3, 4),
            Salt::from_bytes([0x11; SALT_LEN]),
            Nonce::from_bytes([0x22; NONCE_LEN]),
            vec![0x33; 7],
            [0x44; TAG_LEN],
        )
    }

    #[test]
    fn header_layout_is_fixed() {
        assert_eq!(ASSOCIATED_DATA_LEN, 29);
        assert_eq!(HEADER_LEN, 45);
    }

    #[test]
    fn encoding_places_fields_at_documented_offsets() {
        let bytes = sample().to_bytes();

        assert_eq!(bytes.len(), HEADER_LEN + 7 + TAG_LEN);
        assert_eq!(bytes[0], 2);
        assert_eq!(&bytes[1..5], &3u32.to_be_bytes());
        assert_eq!(&bytes[5..9], &65536u32.to_be_bytes());
        assert_eq!(&bytes[9..13], &4u32.to_be_bytes());
        assert_eq!(&bytes[13..29], &[0x11; SALT_LEN]);
        assert_eq!(&bytes[29..41], &[0x22; NONCE_LEN]);
        assert_eq!(&bytes[41..45], &7u32.to_be_bytes());
        assert_eq!(&bytes[45..52], &[0x33; 7]);
        assert_eq!(&bytes[52..], &[0x44; TAG_LEN]);
    }

    #[test]
    fn decoding_restores_every_field() {
        let record = sample();
        let decoded = VaultRecord::from_bytes(&record.to_bytes()).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.associated_data(), record.associated_data());
    }

    #[test]
    fn associated_data_is_header_prefix() {
        let record = sample();
        let bytes = record.to_bytes();
        assert_eq!(&bytes[..ASSOCIATED_DATA_LEN], &record.associated_data());
    }

    #[test]
    fn unknown_version_is_unsupported() {
        let mut bytes = sample().to_bytes();
        bytes[0] = 9;
        assert!(matches!(
            VaultRecord::from_bytes(&bytes),
            Err(VaultError::UnsupportedFormatVersion(9))
        ));

        assert!(matches!(
            VaultRecord::from_bytes(&[0]),
            Err(VaultError::UnsupportedFormatVersion(0))
        ));
    }

    #[test]
    fn truncated_or_padded_blobs_are_rejected() {
        let bytes = sample().to_bytes();

        for len in [0, 1, HEADER_LEN, bytes.len() - 1] {
            assert!(matches!(
                VaultRecord::from_bytes(&bytes[..len]),
                Err(VaultError::WrongPasswordOrTamperedData)
            ));
        }

        let mut padded = bytes.clone();
        padded.push(0);
        assert!(matches!(
            VaultRecord::from_bytes(&padded),
            Err(VaultError::WrongPasswordOrTamperedData)
        ));
    }

    #[test]
    fn oversized_length_prefix_is_rejected() {
        let mut bytes = sample().to_bytes();
        bytes[LEN_OFFSET..HEADER_LEN].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            VaultRecord::from_bytes(&bytes),
            Err(VaultError::WrongPasswordOrTamperedData)
        ));
    }

    #[test]
    fn base64_form_decodes() {
        let record = sample();
        let decoded = VaultRecord::from_base64(&record.to_base64()).unwrap();
        assert_eq!(decoded, record);

        assert!(matches!(
            VaultRecord::from_base64("not base64!"),
            Err(VaultError::WrongPasswordOrTamperedData)
        ));
    }

    #[test]
    fn version_maps_to_kdf() {
        assert_eq!(FormatVersion::V1.kdf(), KdfAlgorithm::Pbkdf2HmacSha256);
        assert_eq!(FormatVersion::V2.kdf(), KdfAlgorithm::Argon2id);
        assert_eq!(CURRENT_FORMAT_VERSION.as_byte(), 2);
        assert_eq!(FormatVersion::V1.to_string(), "v1");
    }

    #[test]
    fn debug_omits_ciphertext_bytes() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("ciphertext_len: 7"));
        assert!(!debug.contains("[51, 51"));
    }
}
