// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password-based key derivation.
//!
//! Current records use Argon2id (Algorithm::Argon2id, Version::V0x13).
//! Legacy records use PBKDF2-HMAC-SHA256 and are only ever derived to be
//! opened and migrated. Every derivation checks its cost parameters against
//! a [`CostBounds`] band before doing any work, since the cost usually comes
//! from an untrusted persisted record.

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use workvpn_config::VaultConfig;
use workvpn_config::validation::ARGON2_MIN_MEMORY_PER_LANE;
use workvpn_core::VaultError;
use zeroize::Zeroizing;

use crate::salt::{SALT_LEN, Salt};

/// Derived key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Upper bound on calibration rounds.
const MAX_CALIBRATION_ROUNDS: usize = 16;

/// Fixed input for calibration trials. The derived key is discarded.
const CALIBRATION_PASSWORD: &[u8] = b"workvpn-calibration";
const CALIBRATION_SALT: [u8; SALT_LEN] = [0x5a; SALT_LEN];

/// Key derivation function selected by a record's format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KdfAlgorithm {
    /// PBKDF2-HMAC-SHA256, used by version 1 records.
    Pbkdf2HmacSha256,
    /// Argon2id v0x13, used by version 2 records.
    Argon2id,
}

/// Persisted cost of a derivation.
///
/// For PBKDF2 only `iterations` is meaningful and the other two fields must
/// be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostParameters {
    pub iterations: u32,
    /// Argon2id memory cost in KiB.
    pub memory_kib: u32,
    /// Argon2id lanes.
    pub parallelism: u32,
}

impl CostParameters {
    /// Size of the fixed-width wire encoding.
    pub const ENCODED_LEN: usize = 12;

    pub const fn argon2id(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            iterations,
            memory_kib,
            parallelism,
        }
    }

    pub const fn pbkdf2(iterations: u32) -> Self {
        Self {
            iterations,
            memory_kib: 0,
            parallelism: 0,
        }
    }

    /// Argon2id cost written into new records.
    pub fn from_config(config: &VaultConfig) -> Self {
        Self::argon2id(
            config.kdf_memory_cost,
            config.kdf_iterations,
            config.kdf_parallelism,
        )
    }

    /// Big-endian `iterations | memory_kib | parallelism`.
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[0..4].copy_from_slice(&self.iterations.to_be_bytes());
        out[4..8].copy_from_slice(&self.memory_kib.to_be_bytes());
        out[8..12].copy_from_slice(&self.parallelism.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8; Self::ENCODED_LEN]) -> Self {
        let word = |i: usize| u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Self {
            iterations: word(0),
            memory_kib: word(4),
            parallelism: word(8),
        }
    }

    /// Whether any component is lower than `other`'s.
    pub fn is_weaker_than(&self, other: &CostParameters) -> bool {
        self.iterations < other.iterations
            || self.memory_kib < other.memory_kib
            || self.parallelism < other.parallelism
    }
}

/// The band of cost parameters a derivation accepts.
///
/// The lower edge stops downgrade attacks; the upper edge stops a tampered
/// record from requesting unbounded memory or time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostBounds {
    pub min_memory_kib: u32,
    pub max_memory_kib: u32,
    pub min_iterations: u32,
    pub max_iterations: u32,
    pub max_parallelism: u32,
    pub legacy_min_iterations: u32,
    pub legacy_max_iterations: u32,
}

impl CostBounds {
    pub fn from_config(config: &VaultConfig) -> Self {
        Self {
            min_memory_kib: config.min_memory_cost,
            max_memory_kib: config.max_memory_cost,
            min_iterations: config.min_iterations,
            max_iterations: config.max_iterations,
            max_parallelism: config.max_parallelism,
            legacy_min_iterations: config.legacy_min_iterations,
            legacy_max_iterations: config.legacy_max_iterations,
        }
    }

    /// Reject cost parameters outside the band for `algorithm`.
    pub fn check(&self, algorithm: KdfAlgorithm, cost: &CostParameters) -> Result<(), VaultError> {
        let invalid = |reason: String| Err(VaultError::InvalidCostParameters(reason));
        match algorithm {
            KdfAlgorithm::Argon2id => {
                if !(self.min_iterations.max(1)..=self.max_iterations).contains(&cost.iterations) {
                    return invalid(format!(
                        "argon2id iterations {} outside {}..={}",
                        cost.iterations, self.min_iterations, self.max_iterations
                    ));
                }
                if !(1..=self.max_parallelism).contains(&cost.parallelism) {
                    return invalid(format!(
                        "argon2id parallelism {} outside 1..={}",
                        cost.parallelism, self.max_parallelism
                    ));
                }
                let floor = self
                    .min_memory_kib
                    .max(ARGON2_MIN_MEMORY_PER_LANE.saturating_mul(cost.parallelism));
                if !(floor..=self.max_memory_kib).contains(&cost.memory_kib) {
                    return invalid(format!(
                        "argon2id memory {} KiB outside {}..={} KiB",
                        cost.memory_kib, floor, self.max_memory_kib
                    ));
                }
            }
            KdfAlgorithm::Pbkdf2HmacSha256 => {
                if !(self.legacy_min_iterations.max(1)..=self.legacy_max_iterations)
                    .contains(&cost.iterations)
                {
                    return invalid(format!(
                        "pbkdf2 iterations {} outside {}..={}",
                        cost.iterations, self.legacy_min_iterations, self.legacy_max_iterations
                    ));
                }
                if cost.memory_kib != 0 || cost.parallelism != 0 {
                    return invalid("pbkdf2 cost must not carry memory or parallelism".to_string());
                }
            }
        }
        Ok(())
    }

    /// Highest iteration count accepted for `algorithm`.
    pub fn max_iterations_for(&self, algorithm: KdfAlgorithm) -> u32 {
        match algorithm {
            KdfAlgorithm::Argon2id => self.max_iterations,
            KdfAlgorithm::Pbkdf2HmacSha256 => self.legacy_max_iterations,
        }
    }
}

impl Default for CostBounds {
    fn default() -> Self {
        Self::from_config(&VaultConfig::default())
    }
}

/// A derived symmetric key.
///
/// Lives only for the duration of one seal/open and is zeroed on drop on
/// every exit path, including errors and unwinding.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl ExposeSecret<[u8; KEY_LEN]> for DerivedKey {
    fn expose_secret(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Result of a calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    /// Cost that met (or came closest to) the target.
    pub cost: CostParameters,
    /// Wall-clock time of the last trial derivation at `cost`.
    pub elapsed: Duration,
    /// False when the band maximum was reached before the target.
    pub target_met: bool,
}

impl Calibration {
    /// Store the calibrated cost as the creation default in `config`.
    pub fn apply_to(&self, config: &mut VaultConfig) {
        config.kdf_memory_cost = self.cost.memory_kib;
        config.kdf_iterations = self.cost.iterations;
        config.kdf_parallelism = self.cost.parallelism;
    }
}

/// Turns a password, salt, and cost into a [`DerivedKey`].
///
/// Holds no key material; cloning or sharing it across threads is free.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDerivationEngine {
    bounds: CostBounds,
}

impl KeyDerivationEngine {
    pub fn new(bounds: CostBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &CostBounds {
        &self.bounds
    }

    /// Derive a 32-byte key. Deterministic in `(algorithm, password, salt, cost)`.
    pub fn derive(
        &self,
        algorithm: KdfAlgorithm,
        password: &[u8],
        salt: &Salt,
        cost: &CostParameters,
    ) -> Result<DerivedKey, VaultError> {
        self.bounds.check(algorithm, cost)?;

        let mut output = Zeroizing::new([0u8; KEY_LEN]);
        match algorithm {
            KdfAlgorithm::Argon2id => {
                let params = argon2::Params::new(
                    cost.memory_kib,
                    cost.iterations,
                    cost.parallelism,
                    Some(KEY_LEN),
                )
                .map_err(|e| VaultError::InvalidCostParameters(format!("argon2id: {e}")))?;

                argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
                    .hash_password_into(password, salt.as_bytes(), output.as_mut())
                    .map_err(|e| VaultError::Internal(format!("Argon2id key derivation failed: {e}")))?;
            }
            KdfAlgorithm::Pbkdf2HmacSha256 => {
                let iterations = NonZeroU32::new(cost.iterations).ok_or_else(|| {
                    VaultError::InvalidCostParameters("pbkdf2 iterations must be non-zero".to_string())
                })?;
                ring::pbkdf2::derive(
                    ring::pbkdf2::PBKDF2_HMAC_SHA256,
                    iterations,
                    salt.as_bytes(),
                    password,
                    output.as_mut(),
                );
            }
        }

        Ok(DerivedKey(output))
    }

    /// Find a cost whose derivation takes at least `target` on this device.
    ///
    /// Starts from `start` and scales the iteration count by the observed
    /// shortfall until the target is met or the band maximum is reached.
    /// Meant to run once per device class; the result is stored as
    /// configuration and passed back in, never kept as hidden state.
    pub fn calibrate(
        &self,
        algorithm: KdfAlgorithm,
        start: CostParameters,
        target: Duration,
    ) -> Result<Calibration, VaultError> {
        let salt = Salt::from_bytes(CALIBRATION_SALT);
        let ceiling = self.bounds.max_iterations_for(algorithm);
        let mut cost = start;

        for round in 0..MAX_CALIBRATION_ROUNDS {
            let started = Instant::now();
            drop(self.derive(algorithm, CALIBRATION_PASSWORD, &salt, &cost)?);
            let elapsed = started.elapsed();

            debug!(
                round,
                iterations = cost.iterations,
                memory_kib = cost.memory_kib,
                elapsed_ms = elapsed.as_millis() as u64,
                "calibration trial"
            );

            if elapsed >= target {
                return Ok(Calibration {
                    cost,
                    elapsed,
                    target_met: true,
                });
            }
            if cost.iterations >= ceiling {
                warn!(
                    iterations = cost.iterations,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "calibration hit the iteration ceiling before reaching its target"
                );
                return Ok(Calibration {
                    cost,
                    elapsed,
                    target_met: false,
                });
            }

            let ratio = target.as_secs_f64() / elapsed.as_secs_f64().max(1e-6);
            let scaled = (f64::from(cost.iterations) * ratio).ceil();
            let next = if scaled >= f64::from(ceiling) {
                ceiling
            } else {
                (scaled as u32).max(cost.iterations + 1)
            };
            cost.iterations = next.min(ceiling);
        }

        Err(VaultError::Internal(format!(
            "calibration did not converge within {MAX_CALIBRATION_ROUNDS} rounds"
        )))
    }

    /// Calibrate Argon2id from the `[vault]` section: start at its creation
    /// cost and aim for its `calibration_target_ms`.
    pub fn calibrate_from_config(&self, config: &VaultConfig) -> Result<Calibration, VaultError> {
        self.calibrate(
            KdfAlgorithm::Argon2id,
            CostParameters::from_config(config),
            config.calibration_target(),
        )
    }
}
