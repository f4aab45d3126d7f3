//! # Request Builder
//!
//! Folds request items into the body document and the header set, and
//! describes the outgoing request as plain data.

use crate::document::RequestDocument;
use crate::error::{Error, Result};
use crate::items::{classify, RequestItem};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Header name to value. [`RequestBuilder`] compares names
/// case-insensitively and the last write wins.
pub type HeaderSet = BTreeMap<String, String>;

/// Methods the command surface accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether the built document is sent as the request body.
    pub fn sends_body(&self) -> bool {
        matches!(self, HttpMethod::Post)
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(Error::UnsupportedMethod {
                method: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body document and headers produced from the command-line items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltRequest {
    pub document: RequestDocument,
    pub headers: HeaderSet,
}

/// Incremental form of [`build`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
    built: BuiltRequest,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and apply one token. On error nothing is applied.
    pub fn push(&mut self, token: &str) -> Result<()> {
        match classify(token)? {
            RequestItem::RawJson { path, value } => self.built.document.merge(&path, value),
            RequestItem::Field { path, value } => {
                self.built.document.merge(&path, Value::String(value))
            }
            RequestItem::Header { name, value } => {
                // Header names are case-insensitive; the latest spelling wins.
                self.built
                    .headers
                    .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
                self.built.headers.insert(name, value);
                Ok(())
            }
        }
    }

    pub fn current(&self) -> &BuiltRequest {
        &self.built
    }

    pub fn finish(self) -> BuiltRequest {
        self.built
    }
}

/// Build the document and headers from tokens, stopping at the first error.
pub fn build<I, T>(tokens: I) -> Result<BuiltRequest>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut builder = RequestBuilder::new();
    for token in tokens {
        builder.push(token.as_ref())?;
    }
    Ok(builder.finish())
}

/// Join a server root and a request path with exactly one `/` between them.
pub fn join_uri(server_root: &str, path: &str) -> String {
    format!(
        "{}/{}",
        server_root.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// A fully described request, ready for a session or a dry run.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    pub uri: String,
    pub headers: HeaderSet,
    pub body: Option<String>,
}

impl OutgoingRequest {
    /// Attach the built items to a method and URI. POST always carries the
    /// document (possibly `{}`) and defaults the content type to JSON.
    pub fn new(method: HttpMethod, uri: String, built: BuiltRequest) -> Result<Self> {
        let BuiltRequest {
            document,
            mut headers,
        } = built;

        let body = if method.sends_body() {
            if !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
                headers.insert("Content-Type".to_string(), "application/json".to_string());
            }
            Some(document.to_json()?)
        } else {
            if !document.is_empty() {
                tracing::warn!("{} requests carry no body; ignoring data fields", method);
            }
            None
        };

        Ok(Self {
            method,
            uri,
            headers,
            body,
        })
    }
}
