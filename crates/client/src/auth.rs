//! HTTP Basic credentials for the Sumo API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};

/// Access id / access key pair sent as HTTP Basic authentication.
///
/// The encoded header value is computed on demand and never cached in plain
/// text; `Debug` output redacts the access key.
#[derive(Debug, Clone)]
pub struct BasicCredentials {
    access_id: String,
    access_key: SecretString,
}

impl BasicCredentials {
    pub fn new(access_id: impl Into<String>, access_key: SecretString) -> Self {
        Self {
            access_id: access_id.into(),
            access_key,
        }
    }

    pub fn access_id(&self) -> &str {
        &self.access_id
    }

    /// Base64 of `"<access_id>:<access_key>"`.
    pub fn encoded(&self) -> SecretString {
        let raw = format!("{}:{}", self.access_id, self.access_key.expose_secret());
        SecretString::new(STANDARD.encode(raw).into())
    }

    /// Full `Authorization` header value, e.g. `Basic Zm9vOmJhcg==`.
    pub fn authorization_header(&self) -> SecretString {
        SecretString::new(format!("Basic {}", self.encoded().expose_secret()).into())
    }
}
