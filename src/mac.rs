//! # MAC Authentication
//!
//! Builds `Authorization: MAC ...` headers. The MAC is an HMAC-SHA256 over
//! the normalized request string
//!
//! ```text
//! <ts>\n<nonce>\n<METHOD>\n<path?query>\n<host>\n<port>\n<ext>\n
//! ```
//!
//! with an empty `ext`, base64-encoded into the header alongside the key
//! identifier (the access token), timestamp and nonce.

use crate::error::{Error, Result};
use crate::request::HttpMethod;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::{distr::Alphanumeric, Rng};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LENGTH: usize = 12;

/// Signs requests with an access token and its MAC key.
#[derive(Debug, Clone)]
pub struct MacSigner {
    id: String,
    key: String,
}

impl MacSigner {
    pub fn new(access_token: &str, mac_key: &str) -> Self {
        Self {
            id: access_token.to_string(),
            key: mac_key.to_string(),
        }
    }

    /// Header value for a request sent now with a fresh nonce.
    pub fn authorization(&self, method: HttpMethod, uri: &str) -> Result<String> {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let nonce: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LENGTH)
            .map(char::from)
            .collect();
        self.authorization_with(method, uri, ts, &nonce)
    }

    /// Header value for a fixed timestamp and nonce.
    pub fn authorization_with(
        &self,
        method: HttpMethod,
        uri: &str,
        ts: u64,
        nonce: &str,
    ) -> Result<String> {
        let normalized = normalized_request_string(method, uri, ts, nonce)?;

        let mut mac = HmacSha256::new_from_slice(self.key.as_bytes()).map_err(|e| {
            Error::Signing {
                reason: e.to_string(),
            }
        })?;
        mac.update(normalized.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        Ok(format!(
            "MAC id=\"{}\", ts=\"{}\", nonce=\"{}\", mac=\"{}\"",
            self.id, ts, nonce, signature
        ))
    }
}

fn normalized_request_string(
    method: HttpMethod,
    uri: &str,
    ts: u64,
    nonce: &str,
) -> Result<String> {
    let url = Url::parse(uri).map_err(|e| Error::Signing {
        reason: format!("invalid URI '{uri}': {e}"),
    })?;
    let host = url.host_str().ok_or_else(|| Error::Signing {
        reason: format!("URI '{uri}' has no host"),
    })?;
    let port = url.port_or_known_default().ok_or_else(|| Error::Signing {
        reason: format!("URI '{uri}' has no port"),
    })?;

    let mut request_uri = url.path().to_string();
    if let Some(query) = url.query() {
        request_uri.push('?');
        request_uri.push_str(query);
    }

    Ok(format!(
        "{ts}\n{nonce}\n{method}\n{request_uri}\n{host}\n{port}\n\n",
        host = host.to_lowercase()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_string_should_include_default_port() {
        let normalized = normalized_request_string(
            HttpMethod::Post,
            "https://api.example.com/posts?limit=5",
            1336363200,
            "dj83hs9s",
        )
        .unwrap();

        assert_eq!(
            normalized,
            "1336363200\ndj83hs9s\nPOST\n/posts?limit=5\napi.example.com\n443\n\n"
        );
    }

    #[test]
    fn authorization_should_match_known_signature() {
        let signer = MacSigner::new("token-1", "secret-key");
        let header = signer
            .authorization_with(
                HttpMethod::Post,
                "https://api.example.com/posts?limit=5",
                1336363200,
                "dj83hs9s",
            )
            .unwrap();

        assert_eq!(
            header,
            "MAC id=\"token-1\", ts=\"1336363200\", nonce=\"dj83hs9s\", mac=\"SBbqMpMngQ176nyokWqV5CIZXTj4Tb3Vru3Q7VV0lBs=\""
        );
    }

    #[test]
    fn authorization_should_lowercase_host_and_keep_explicit_port() {
        let signer = MacSigner::new("token-1", "secret-key");
        let header = signer
            .authorization_with(HttpMethod::Get, "http://LocalHost:8080", 1336363200, "dj83hs9s")
            .unwrap();

        assert!(header.ends_with("mac=\"1qu4Ej6ChtwBhS6Zm+Ag3s7d5x2C8mUchlFWF+RDudM=\""));
    }

    #[test]
    fn fresh_authorization_should_use_random_nonce() {
        let signer = MacSigner::new("token-1", "secret-key");
        let first = signer.authorization(HttpMethod::Get, "https://api.example.com/").unwrap();
        let second = signer.authorization(HttpMethod::Get, "https://api.example.com/").unwrap();

        assert!(first.starts_with("MAC id=\"token-1\", ts=\""));
        assert_ne!(first, second);
    }

    #[test]
    fn relative_uri_should_not_be_signed() {
        let signer = MacSigner::new("token-1", "secret-key");
        let err = signer.authorization(HttpMethod::Get, "/posts").unwrap_err();
        assert!(matches!(err, Error::Signing { .. }));
    }
}
