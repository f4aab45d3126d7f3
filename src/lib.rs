//! # macline - HTTP client for MAC-authenticated REST APIs
//!
//! Turns command-line items into a JSON request body and headers, sends
//! the request through a MAC-signed session and renders the response.
//!
//! ## Architecture
//!
//! ```text
//! tokens ─► items ─► request ─► session ─► response ─► output + exit code
//!             │         ▲          ▲
//!             ▼         │          │
//!          document ────┘       config
//! ```
//!
//! - [`items`] classifies `name:=json`, `name=value` and `Header:value`.
//! - [`document`] places values in the nested body by dotted path.
//! - [`request`] folds items into a body and header set.
//! - [`config`] loads and saves the server root and credentials.
//! - [`session`] and [`mac`] sign and send the request.
//! - [`response`] decides how the response is shown and the exit code.
//! - [`cmd`] runs one invocation.

pub mod cmd;
pub mod cmd_args;
pub mod config;
pub mod document;
pub mod error;
pub mod items;
pub mod mac;
pub mod request;
pub mod response;
pub mod session;

// Re-export main types for easy access
pub use config::{
    ConfigReader, ConfigWriter, Configuration, Credentials, FileConfigStore,
};
pub use document::RequestDocument;
pub use error::{Error, Result};
pub use items::{classify, DottedPath, RequestItem};
pub use request::{build, BuiltRequest, HeaderSet, HttpMethod, OutgoingRequest, RequestBuilder};
pub use response::{RenderOptions, RenderPlan, ResponseOutcome};
pub use session::{MacSession, Session};
