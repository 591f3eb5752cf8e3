// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Salted PBKDF2 verifier for the local app-login password.
//!
//! Stored form: standard base64 of `salt[16] || pbkdf2_hmac_sha256[32]`.
//! Older installs kept a bare base64 encoding of the password; those are
//! detected by [`is_legacy_hash`] so the caller can force a reset.

use std::num::NonZeroU32;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use workvpn_core::{EntropySource, OsEntropy, VaultError};

use crate::kdf::KEY_LEN;
use crate::salt::{SALT_LEN, SaltManager};

/// Decoded length of a salted hash.
pub const ENCODED_HASH_LEN: usize = SALT_LEN + KEY_LEN;

/// Encoded strings shorter than this cannot hold a salted hash.
const MIN_ENCODED_CHARS: usize = 50;

/// PBKDF2 iterations the login hash has always used.
pub const DEFAULT_ITERATIONS: NonZeroU32 = NonZeroU32::MIN.saturating_add(100_000 - 1);

/// Hashes and verifies login passwords.
#[derive(Debug)]
pub struct PasswordVerifier<E = OsEntropy> {
    iterations: NonZeroU32,
    salts: SaltManager<E>,
}

impl PasswordVerifier<OsEntropy> {
    pub fn new() -> Self {
        Self::with_entropy(OsEntropy)
    }
}

impl Default for PasswordVerifier<OsEntropy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntropySource> PasswordVerifier<E> {
    pub fn with_entropy(entropy: E) -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            salts: SaltManager::with_entropy(entropy),
        }
    }

    /// Use a different PBKDF2 iteration count. Hashes are only verifiable
    /// with the count they were created with.
    pub fn with_iterations(mut self, iterations: NonZeroU32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn hash(&self, password: &SecretString) -> Result<String, VaultError> {
        let salt = self.salts.new_salt()?;
        let mut out = zeroize::Zeroizing::new([0u8; ENCODED_HASH_LEN]);
        out[..SALT_LEN].copy_from_slice(salt.as_bytes());
        ring::pbkdf2::derive(
            ring::pbkdf2::PBKDF2_HMAC_SHA256,
            self.iterations,
            salt.as_bytes(),
            password.expose_secret().as_bytes(),
            &mut out[SALT_LEN..],
        );
        Ok(STANDARD.encode(out.as_slice()))
    }

    /// Constant-time check of `password` against a stored hash. Malformed
    /// input verifies as `false`.
    pub fn verify(&self, password: &SecretString, encoded: &str) -> bool {
        let Ok(stored) = STANDARD.decode(encoded.trim()) else {
            return false;
        };
        if stored.len() < ENCODED_HASH_LEN {
            return false;
        }
        let (salt, expected) = stored.split_at(SALT_LEN);
        ring::pbkdf2::verify(
            ring::pbkdf2::PBKDF2_HMAC_SHA256,
            self.iterations,
            salt,
            password.expose_secret().as_bytes(),
            expected,
        )
        .is_ok()
    }
}

/// Whether `encoded` predates salted hashing.
pub fn is_legacy_hash(encoded: &str) -> bool {
    if encoded.len() < MIN_ENCODED_CHARS {
        return true;
    }
    match STANDARD.decode(encoded.trim()) {
        Ok(bytes) => bytes.len() < ENCODED_HASH_LEN,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use workvpn_test_utils::FailingEntropy;

    use super::*;

    fn verifier() -> PasswordVerifier {
        PasswordVerifier::new().with_iterations(NonZeroU32::new(1_000).unwrap())
    }

    fn pw(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn hash_then_verify() {
        let v = verifier();
        let hash = v.hash(&pw("login-pass")).unwrap();

        assert!(v.verify(&pw("login-pass"), &hash));
        assert!(!v.verify(&pw("login-pasS"), &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let v = verifier();
        let a = v.hash(&pw("same")).unwrap();
        let b = v.hash(&pw("same")).unwrap();

        assert_ne!(a, b);
        assert_eq!(STANDARD.decode(&a).unwrap().len(), ENCODED_HASH_LEN);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn iteration_count_is_part_of_the_hash() {
        let hash = verifier().hash(&pw("pw")).unwrap();
        let other = PasswordVerifier::new().with_iterations(NonZeroU32::new(2_000).unwrap());
        assert!(!other.verify(&pw("pw"), &hash));
    }

    #[test]
    fn malformed_input_does_not_verify() {
        let v = verifier();
        assert!(!v.verify(&pw("pw"), "not base64 at all!"));
        assert!(!v.verify(&pw("pw"), &STANDARD.encode([0u8; 20])));
        assert!(!v.verify(&pw("pw"), ""));
    }

    #[test]
    fn legacy_hashes_are_detected() {
        assert!(is_legacy_hash(&STANDARD.encode("password123")));
        assert!(is_legacy_hash(&"!".repeat(64)));
        assert!(!is_legacy_hash(&verifier().hash(&pw("pw")).unwrap()));
    }

    #[test]
    fn default_iterations_match_login_scheme() {
        assert_eq!(DEFAULT_ITERATIONS.get(), 100_000);
    }

    #[test]
    fn entropy_failure_is_reported() {
        let v = PasswordVerifier::with_entropy(FailingEntropy);
        assert!(matches!(v.hash(&pw("pw")), Err(VaultError::EntropyUnavailable)));
    }
}
