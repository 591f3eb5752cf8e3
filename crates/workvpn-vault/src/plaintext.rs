// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret payloads: the bytes sealed inside a record, and the typed VPN
//! credential set most records carry.

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use workvpn_core::VaultError;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Serialized secret material. Zeroed on drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialPlaintext(Zeroizing<Vec<u8>>);

impl CredentialPlaintext {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Serialize `value` as JSON.
    pub fn from_json<T: Serialize>(value: &T) -> Result<Self, VaultError> {
        serde_json::to_vec(value)
            .map(Self::new)
            .map_err(|e| json_error("serialize", &e))
    }

    /// Deserialize the payload as JSON.
    pub fn to_json<T: DeserializeOwned>(&self) -> Result<T, VaultError> {
        serde_json::from_slice(&self.0).map_err(|e| json_error("deserialize", &e))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// serde_json messages can quote the offending value, so only position and
// category are kept.
fn json_error(action: &str, e: &serde_json::Error) -> VaultError {
    VaultError::Encoding(format!(
        "failed to {action} credential payload ({:?} error at line {}, column {})",
        e.classify(),
        e.line(),
        e.column()
    ))
}

impl ExposeSecret<[u8]> for CredentialPlaintext {
    fn expose_secret(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for CredentialPlaintext {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<Zeroizing<Vec<u8>>> for CredentialPlaintext {
    fn from(bytes: Zeroizing<Vec<u8>>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for CredentialPlaintext {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for CredentialPlaintext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CredentialPlaintext([REDACTED; {} bytes])", self.0.len())
    }
}

/// Connection secrets for one VPN profile.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct VpnCredentials {
    /// Profile name the credentials belong to.
    pub profile: String,
    /// Gateway host or `host:port`.
    pub server_address: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_shared_key: Option<String>,
    /// PEM-encoded client private key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_auth: Option<String>,
}

impl VpnCredentials {
    pub fn new(
        profile: impl Into<String>,
        server_address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            profile: profile.into(),
            server_address: server_address.into(),
            username: username.into(),
            password: password.into(),
            pre_shared_key: None,
            private_key: None,
            tls_auth: None,
        }
    }

    pub fn with_pre_shared_key(mut self, psk: impl Into<String>) -> Self {
        self.pre_shared_key = Some(psk.into());
        self
    }

    pub fn with_private_key(mut self, pem: impl Into<String>) -> Self {
        self.private_key = Some(pem.into());
        self
    }

    pub fn with_tls_auth(mut self, key: impl Into<String>) -> Self {
        self.tls_auth = Some(key.into());
        self
    }

    pub fn to_plaintext(&self) -> Result<CredentialPlaintext, VaultError> {
        CredentialPlaintext::from_json(self)
    }

    pub fn from_plaintext(plaintext: &CredentialPlaintext) -> Result<Self, VaultError> {
        plaintext.to_json()
    }
}

impl std::fmt::Debug for VpnCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |present: bool| if present { "[REDACTED]" } else { "None" };
        f.debug_struct("VpnCredentials")
            .field("profile", &self.profile)
            .field("server_address", &self.server_address)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("pre_shared_key", &redacted(self.pre_shared_key.is_some()))
            .field("private_key", &redacted(self.private_key.is_some()))
            .field("tls_auth", &redacted(self.tls_auth.is_some()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office() -> VpnCredentials {
        VpnCredentials::new("office", "vpn.example.com:1194", "alice", "hunter2")
            .with_pre_shared_key("psk-material")
    }

    #[test]
    fn credentials_survive_plaintext_conversion() {
        let creds = office();
        let plaintext = creds.to_plaintext().unwrap();
        assert_eq!(VpnCredentials::from_plaintext(&plaintext).unwrap(), creds);
    }

    #[test]
    fn absent_optionals_are_omitted_from_json() {
        let plaintext = VpnCredentials::new("p", "h", "u", "pw").to_plaintext().unwrap();
        let json = std::str::from_utf8(plaintext.expose_secret()).unwrap();
        assert!(!json.contains("private_key"));
        assert!(!json.contains("tls_auth"));
    }

    #[test]
    fn debug_redacts_secret_fields() {
        let debug = format!("{:?}", office().with_private_key("-----BEGIN KEY-----"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("psk-material"));
        assert!(!debug.contains("BEGIN KEY"));
        assert!(debug.contains("tls_auth: \"None\""));
    }

    #[test]
    fn plaintext_debug_shows_only_length() {
        let plaintext = CredentialPlaintext::from("top secret");
        assert_eq!(format!("{plaintext:?}"), "CredentialPlaintext([REDACTED; 10 bytes])");
    }

    #[test]
    fn decode_error_does_not_echo_payload() {
        let plaintext = CredentialPlaintext::from(r#"{"profile": "s3cr3t-value"}"#);
        let err = VpnCredentials::from_plaintext(&plaintext).unwrap_err();
        assert!(matches!(err, VaultError::Encoding(_)));
        assert!(!err.to_string().contains("s3cr3t-value"));
    }

    #[test]
    fn zeroize_clears_fields() {
        let mut creds = office();
        creds.zeroize();
        assert!(creds.password.is_empty());
        assert!(creds.pre_shared_key.is_none());
    }
}
