//! # Configuration
//!
//! The server root and MAC credentials persisted as a flat JSON record.
//!
//! The record is created by `macline --configure`, read once per
//! invocation and always rewritten wholesale.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Default configuration file path for macline
pub const DEFAULT_CONFIG_PATH: &str = "~/.macline/config.json";

/// Environment variable name for overriding the configuration path
pub const CONFIG_PATH_ENV_VAR: &str = "MACLINE_CONFIG";

/// Get the configuration file path: explicit flag first, then the
/// environment variable, then the default. `~` is expanded.
pub fn get_config_path(explicit: Option<&str>) -> PathBuf {
    let raw = explicit.map(str::to_string).unwrap_or_else(|| {
        std::env::var_os(CONFIG_PATH_ENV_VAR)
            .and_then(|val| val.into_string().ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    });
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

/// The persisted record. Fields may be absent in a hand-edited file.
///
/// Field order is alphabetical so the file is written with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_root: Option<String>,
}

/// A configuration with every field present, the only thing a request
/// can be issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub server_root: String,
    pub access_token: String,
    pub mac_key: String,
}

impl Configuration {
    pub fn new(server_root: &str, access_token: &str, mac_key: &str) -> Self {
        Self {
            access_token: Some(access_token.to_string()),
            mac_key: Some(mac_key.to_string()),
            server_root: Some(server_root.to_string()),
        }
    }

    /// Names of the fields that are absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("server_root", &self.server_root),
            ("access_token", &self.access_token),
            ("mac_key", &self.mac_key),
        ];
        fields
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn credentials(&self) -> Result<Credentials> {
        match (&self.server_root, &self.access_token, &self.mac_key) {
            (Some(server_root), Some(access_token), Some(mac_key))
                if !server_root.is_empty() && !access_token.is_empty() && !mac_key.is_empty() =>
            {
                Ok(Credentials {
                    server_root: server_root.clone(),
                    access_token: access_token.clone(),
                    mac_key: mac_key.clone(),
                })
            }
            _ => Err(Error::MissingConfiguration {
                missing: self.missing_fields(),
            }),
        }
    }
}

/// Source of the persisted configuration.
pub trait ConfigReader {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Configuration>>;
}

/// Sink for the persisted configuration.
pub trait ConfigWriter {
    fn save(&self, config: &Configuration) -> Result<()>;
}

/// Load the configuration and insist on complete credentials.
pub fn require_credentials(reader: &impl ConfigReader) -> Result<Credentials> {
    match reader.load()? {
        Some(config) => config.credentials(),
        None => Err(Error::MissingConfiguration {
            missing: Configuration::default().missing_fields(),
        }),
    }
}

/// Configuration stored as a JSON file.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn invalid(&self, reason: impl ToString) -> Error {
        Error::InvalidConfiguration {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ConfigReader for FileConfigStore {
    fn load(&self) -> Result<Option<Configuration>> {
        tracing::debug!("Loading configuration from '{}'", self.path.display());

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No configuration file at '{}'", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let config = serde_json::from_str(&text).map_err(|e| self.invalid(e))?;
        Ok(Some(config))
    }
}

impl ConfigWriter for FileConfigStore {
    /// Write to a temporary file next to the target, then rename it over
    /// the target so readers never see a half-written record.
    fn save(&self, config: &Configuration) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut text = serde_json::to_string_pretty(config).map_err(|e| self.invalid(e))?;
        text.push('\n');

        let mut file = tempfile::NamedTempFile::new_in(&dir)?;
        file.write_all(text.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| Error::from(e.error))?;

        tracing::debug!("Configuration saved to '{}'", self.path.display());
        Ok(())
    }
}

/// Check that a server root is an absolute http(s) URL.
pub fn validate_server_root(server_root: &str) -> std::result::Result<(), String> {
    let url = url::Url::parse(server_root).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(()),
        "http" | "https" => Err("missing host".to_string()),
        scheme => Err(format!("unsupported scheme '{scheme}'")),
    }
}

/// Ask for each field on `output`, reading answers from `input`. An
/// empty answer keeps the current value.
pub fn prompt_configuration<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    current: Option<&Configuration>,
) -> Result<Configuration> {
    let current = current.cloned().unwrap_or_default();

    let server_root = loop {
        let answer = prompt_field(&mut input, &mut output, "Server root", &current.server_root)?;
        match validate_server_root(&answer) {
            Ok(()) => break answer,
            Err(reason) => writeln!(output, "Invalid server root: {reason}")?,
        }
    };
    let access_token = prompt_field(&mut input, &mut output, "Access token", &current.access_token)?;
    let mac_key = prompt_field(&mut input, &mut output, "MAC key", &current.mac_key)?;

    Ok(Configuration::new(&server_root, &access_token, &mac_key))
}

fn prompt_field<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    current: &Option<String>,
) -> Result<String> {
    match current.as_deref().filter(|value| !value.is_empty()) {
        Some(value) => write!(output, "{label} [{value}]: ")?,
        None => write!(output, "{label}: ")?,
    }
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("no value given for {label}"),
        )
        .into());
    }

    let answer = line.trim();
    if answer.is_empty() {
        Ok(current.clone().unwrap_or_default())
    } else {
        Ok(answer.to_string())
    }
}
