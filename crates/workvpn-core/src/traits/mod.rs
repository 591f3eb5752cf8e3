// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits the vault depends on.
//!
//! Both are narrow, synchronous interfaces so the vault logic can be tested
//! against in-memory fakes.

pub mod entropy;
pub mod store;

pub use entropy::{EntropySource, OsEntropy};
pub use store::SecureStore;
