//! Query canonicalization and HMAC-SHA256 request signing.
//!
//! ```text
//! StringToSign = "POST" + "\n" +
//!                Host + "\n" +
//!                Path + "\n" +
//!                sorted(key=value items) joined with "&"
//! Signature    = Base64(HMAC-SHA256(SecretKey, StringToSign))
//! ```

use crate::api::error::ApiError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Access key pair. The secret only ever feeds the HMAC and is never sent.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Public key id, sent as `AWSAccessKeyId`
    #[serde(default)]
    pub access_key: String,
    /// Signing secret
    #[serde(default)]
    pub secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self { access_key: access_key.into(), secret_key: secret_key.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Signs query strings for one endpoint.
#[derive(Debug, Clone)]
pub struct Signer {
    host: String,
    path: String,
    credentials: Credentials,
}

impl Signer {
    /// Creates a signer for `endpoint`, which must be an absolute URL with a host.
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self, ApiError> {
        let url = Url::parse(endpoint)
            .map_err(|e| ApiError::Config(format!("invalid endpoint {endpoint}: {e}")))?;

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(ApiError::Config(format!("endpoint {endpoint} has no host"))),
        };

        let path = if url.path().is_empty() { "/".to_string() } else { url.path().to_string() };

        Ok(Self { host, path, credentials })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sorts the `&`-separated items of `query` by key.
    ///
    /// Only the first `=` separates key from value, and items with equal keys
    /// keep their relative order.
    pub fn canonical_query(query: &str) -> String {
        let mut items: Vec<&str> = query.split('&').collect();
        items.sort_by(|a, b| item_key(a).cmp(item_key(b)));
        items.join("&")
    }

    /// The exact text covered by the signature.
    pub fn string_to_sign(&self, query: &str) -> String {
        format!("POST\n{}\n{}\n{}", self.host, self.path, Self::canonical_query(query))
    }

    /// Base64 HMAC-SHA256 of [`string_to_sign`](Self::string_to_sign).
    pub fn sign(&self, query: &str) -> String {
        let string_to_sign = self.string_to_sign(query);

        let mut mac = HmacSha256::new_from_slice(self.credentials.secret_key.as_bytes())
            .expect("HMAC can accept keys of any length");
        mac.update(string_to_sign.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

fn item_key(item: &str) -> &str {
    item.split_once('=').map_or(item, |(key, _)| key)
}
