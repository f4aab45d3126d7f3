//! # Response Handling
//!
//! Decides how a response is shown and whether the invocation succeeded,
//! then writes it out.

use crate::error::{Error, Result};
use crate::request::HeaderSet;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// A received response as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseOutcome {
    pub status: u16,
    pub reason: Option<String>,
    pub headers: HeaderSet,
    pub body: Bytes,
    pub content_type: Option<String>,
}

impl ResponseOutcome {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            reason: None,
            headers: HeaderSet::new(),
            body: body.into(),
            content_type: content_type.map(str::to_string),
        }
    }

    /// Body as text, decoded with the charset named in the content type.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }

    /// e.g. `200 OK`
    pub fn status_line(&self) -> String {
        match &self.reason {
            Some(reason) if !reason.is_empty() => format!("{} {}", self.status, reason),
            _ => self.status.to_string(),
        }
    }
}

/// How a response is to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPlan {
    /// 502: the server root could not be reached through its gateway.
    GatewayUnreachable,
    /// 2xx; JSON bodies are re-serialized with sorted keys.
    Success { pretty_json: bool },
    /// Any other status. [`render`] attaches the raw body, undecoded by
    /// any JSON formatting, as [`Error::Remote`].
    Failure { status: u16 },
}

impl RenderPlan {
    pub fn exit_code(&self) -> i32 {
        match self {
            RenderPlan::Success { .. } => 0,
            RenderPlan::GatewayUnreachable | RenderPlan::Failure { .. } => 1,
        }
    }
}

/// Classify a status code and content type.
pub fn classify(status: u16, content_type: Option<&str>) -> RenderPlan {
    if status == 502 {
        return RenderPlan::GatewayUnreachable;
    }
    if (200..300).contains(&status) {
        return RenderPlan::Success {
            pretty_json: content_type.is_some_and(is_json_content_type),
        };
    }
    RenderPlan::Failure { status }
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("application/json")
}

/// Output toggles from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Print the status line and response headers first.
    pub show_headers: bool,
    /// Suppress the body.
    pub quiet: bool,
}

/// Write a response according to its render plan.
///
/// Succeeds only for 2xx responses; every other status ends up as an
/// error carrying what the caller needs to report it.
pub fn render<W: Write>(
    outcome: &ResponseOutcome,
    server_root: &str,
    options: &RenderOptions,
    out: &mut W,
) -> Result<()> {
    let plan = classify(outcome.status, outcome.content_type.as_deref());
    tracing::debug!("Response {} classified as {:?}", outcome.status, plan);

    match plan {
        RenderPlan::GatewayUnreachable => Err(Error::GatewayUnreachable {
            server_root: server_root.to_string(),
        }),
        RenderPlan::Failure { status } => Err(Error::Remote {
            status,
            body: outcome.text(),
        }),
        RenderPlan::Success { pretty_json } => {
            if options.show_headers {
                write_headers(outcome, out)?;
            }
            if !options.quiet {
                let text = if pretty_json {
                    pretty_print(&outcome.body).unwrap_or_else(|e| {
                        tracing::warn!("Response claims JSON but does not parse: {}", e);
                        outcome.text()
                    })
                } else {
                    outcome.text()
                };
                if !text.is_empty() {
                    write!(out, "{text}")?;
                    if !text.ends_with('\n') {
                        writeln!(out)?;
                    }
                }
            }
            out.flush()?;
            Ok(())
        }
    }
}

fn write_headers<W: Write>(outcome: &ResponseOutcome, out: &mut W) -> Result<()> {
    writeln!(out, "{}", outcome.status_line())?;
    for (name, value) in &outcome.headers {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out)?;
    Ok(())
}

/// Re-serialize a JSON body with sorted keys and 4-space indentation.
pub fn pretty_print(body: &[u8]) -> std::result::Result<String, serde_json::Error> {
    // serde_json's Map is ordered by key, so parsing sorts the keys
    let value: Value = serde_json::from_slice(body)?;
    pretty_print_value(&value)
}

pub fn pretty_print_value(value: &Value) -> std::result::Result<String, serde_json::Error> {
    let mut buf: Vec<u8> = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Decode a body using the `charset` parameter of the content type,
/// falling back to UTF-8. Malformed sequences are replaced.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_of)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);
    let (text, _, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!("Response body is not valid {}", encoding.name());
    }
    text.into_owned()
}

fn charset_of(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}
