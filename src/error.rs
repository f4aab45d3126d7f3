//! # Errors
//!
//! Every failure an invocation can end with. All of them are terminal:
//! the process reports the error once and exits with [`Error::exit_code`].

use std::path::PathBuf;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The token matched none of the `:=`, `=` or `:` grammars.
    #[error("invalid request item '{token}': expected name:=json, name=value or Header:value")]
    InvalidInput { token: String },

    #[error("invalid JSON in request item '{token}': {raw}")]
    InvalidJson {
        token: String,
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    /// A merge tried to descend through a value that is not an object.
    #[error("cannot set '{path}': '{segment}' already holds a non-object value")]
    PathConflict { path: String, segment: String },

    #[error("missing configuration: {}; run `macline --configure`", .missing.join(", "))]
    MissingConfiguration { missing: Vec<&'static str> },

    #[error("invalid configuration in {}: {reason}; run `macline --configure`", .path.display())]
    InvalidConfiguration { path: PathBuf, reason: String },

    #[error("unsupported method '{method}': use GET, POST or DELETE")]
    UnsupportedMethod { method: String },

    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("could not reach {server_root} (bad gateway)")]
    GatewayUnreachable { server_root: String },

    #[error("server returned HTTP {status}\n{body}")]
    Remote { status: u16, body: String },

    #[error("request failed")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    #[error("cannot sign request: {reason}")]
    Signing { reason: String },

    #[error(transparent)]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// A closed stdout (`macline GET /x | head`) is not a failure.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Error::Io { source } if source.kind() == std::io::ErrorKind::BrokenPipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configuration_should_list_every_field() {
        let err = Error::MissingConfiguration {
            missing: vec!["server_root", "mac_key"],
        };
        let message = err.to_string();
        assert!(message.contains("server_root, mac_key"));
        assert!(message.contains("--configure"));
    }

    #[test]
    fn remote_error_should_carry_status_and_body() {
        let err = Error::Remote {
            status: 404,
            body: "{\"error\":\"not found\"}".to_string(),
        };
        assert_eq!(err.to_string(), "server returned HTTP 404\n{\"error\":\"not found\"}");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn broken_pipe_should_be_detected() {
        let err = Error::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(err.is_broken_pipe());

        let err = Error::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(!err.is_broken_pipe());
    }
}
