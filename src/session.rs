//! # Session
//!
//! The authenticated transport. The rest of the crate only sees the
//! [`Session`] trait; [`MacSession`] is the reqwest-backed implementation
//! that signs every request with [`MacSigner`].

use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::mac::MacSigner;
use crate::request::{HeaderSet, HttpMethod, OutgoingRequest};
use crate::response::ResponseOutcome;
use bytes::Bytes;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

/// Sends requests and hands back responses as plain data. Non-2xx
/// statuses are responses, not errors.
pub trait Session {
    fn get(&self, uri: &str, headers: &HeaderSet) -> Result<ResponseOutcome>;

    fn post(&self, uri: &str, headers: &HeaderSet, body: Bytes) -> Result<ResponseOutcome>;

    fn delete(&self, uri: &str, headers: &HeaderSet) -> Result<ResponseOutcome>;

    /// Dispatch an [`OutgoingRequest`] to the matching method.
    fn send(&self, request: &OutgoingRequest) -> Result<ResponseOutcome> {
        match request.method {
            HttpMethod::Get => self.get(&request.uri, &request.headers),
            HttpMethod::Post => {
                let body = request.body.clone().unwrap_or_default();
                self.post(&request.uri, &request.headers, Bytes::from(body))
            }
            HttpMethod::Delete => self.delete(&request.uri, &request.headers),
        }
    }
}

/// MAC-signed HTTP session over a blocking reqwest client.
pub struct MacSession {
    client: Client,
    signer: MacSigner,
}

impl MacSession {
    pub fn new(credentials: &Credentials) -> Result<Self> {
        tracing::debug!("Creating MAC session for '{}'", credentials.server_root);
        let client = Client::builder()
            .user_agent(concat!("macline/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            signer: MacSigner::new(&credentials.access_token, &credentials.mac_key),
        })
    }

    fn execute(
        &self,
        method: HttpMethod,
        uri: &str,
        builder: RequestBuilder,
        headers: &HeaderSet,
    ) -> Result<ResponseOutcome> {
        let mut header_map = to_header_map(headers)?;
        let authorization = self.signer.authorization(method, uri)?;
        let authorization = HeaderValue::from_str(&authorization).map_err(|_| Error::Signing {
            reason: "authorization header is not valid ASCII".to_string(),
        })?;
        header_map.insert(AUTHORIZATION, authorization);

        tracing::info!("{} {}", method, uri);
        let response = builder.headers(header_map).send()?;
        from_response(response)
    }
}

impl Session for MacSession {
    fn get(&self, uri: &str, headers: &HeaderSet) -> Result<ResponseOutcome> {
        self.execute(HttpMethod::Get, uri, self.client.get(uri), headers)
    }

    fn post(&self, uri: &str, headers: &HeaderSet, body: Bytes) -> Result<ResponseOutcome> {
        self.execute(HttpMethod::Post, uri, self.client.post(uri).body(body), headers)
    }

    fn delete(&self, uri: &str, headers: &HeaderSet) -> Result<ResponseOutcome> {
        self.execute(HttpMethod::Delete, uri, self.client.delete(uri), headers)
    }
}

/// Convert user-supplied headers, rejecting names or values HTTP cannot carry.
pub fn to_header_map(headers: &HeaderSet) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let invalid = || Error::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn from_response(response: reqwest::blocking::Response) -> Result<ResponseOutcome> {
    let status = response.status();
    let headers: HeaderSet = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.bytes()?;

    tracing::debug!("Received {} ({} bytes)", status.as_u16(), body.len());

    Ok(ResponseOutcome {
        status: status.as_u16(),
        reason: status.canonical_reason().map(str::to_string),
        headers,
        body,
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_map_should_carry_all_headers() {
        let mut headers = HeaderSet::new();
        headers.insert("X-Trace".to_string(), "abc123".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());

        let map = to_header_map(&headers).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("x-trace").unwrap(), "abc123");
        assert_eq!(map.get("accept").unwrap(), "application/json");
    }

    #[test]
    fn header_map_should_reject_invalid_name() {
        let mut headers = HeaderSet::new();
        headers.insert("Bad Header".to_string(), "v".to_string());

        let err = to_header_map(&headers).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { name } if name == "Bad Header"));
    }

    #[test]
    fn header_map_should_reject_invalid_value() {
        let mut headers = HeaderSet::new();
        headers.insert("X-Note".to_string(), "line\nbreak".to_string());

        let err = to_header_map(&headers).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { .. }));
    }

    #[test]
    fn session_should_build_from_credentials() {
        let credentials = Credentials {
            server_root: "https://api.example.com".to_string(),
            access_token: "token".to_string(),
            mac_key: "key".to_string(),
        };
        assert!(MacSession::new(&credentials).is_ok());
    }
}
