//! # Commands
//!
//! One invocation end to end. Credentials are checked and the request is
//! built before any session exists, so configuration and item errors
//! never reach the network.

use crate::cmd_args::CommandLineArgs;
use crate::config::{
    prompt_configuration, require_credentials, ConfigReader, ConfigWriter, Configuration,
    Credentials,
};
use crate::error::{Error, Result};
use crate::request::{build, join_uri, HttpMethod, OutgoingRequest};
use crate::response::{pretty_print_value, render, RenderOptions};
use crate::session::Session;
use serde_json::Value;
use std::io::{BufRead, Write};

/// A request invocation decoded from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub method: HttpMethod,
    pub path: String,
    pub items: Vec<String>,
    pub verbose: bool,
    pub dry_run: bool,
    pub render: RenderOptions,
}

impl Invocation {
    pub fn new(method: HttpMethod, path: &str, items: &[&str]) -> Self {
        Self {
            method,
            path: path.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
            verbose: false,
            dry_run: false,
            render: RenderOptions::default(),
        }
    }

    pub fn from_args(args: &CommandLineArgs) -> Result<Self> {
        let method = args.method().unwrap_or_default().parse()?;
        Ok(Self {
            method,
            path: args.path().unwrap_or("/").to_string(),
            items: args.items().to_vec(),
            verbose: args.verbose(),
            dry_run: args.dry_run(),
            render: RenderOptions {
                show_headers: args.show_headers(),
                quiet: args.quiet(),
            },
        })
    }
}

/// Run a request invocation.
///
/// `connect` opens the session and is only called once the request is
/// fully built and not a dry run. `out` receives the rendered response
/// (or the dry-run request), `log` the verbose request echo.
pub fn run_request<R, S, F, W, L>(
    invocation: &Invocation,
    reader: &R,
    connect: F,
    out: &mut W,
    log: &mut L,
) -> Result<()>
where
    R: ConfigReader,
    S: Session,
    F: FnOnce(&Credentials) -> Result<S>,
    W: Write,
    L: Write,
{
    let credentials = require_credentials(reader)?;

    let built = build(&invocation.items)?;
    let uri = join_uri(&credentials.server_root, &invocation.path);
    let request = OutgoingRequest::new(invocation.method, uri, built)?;

    if invocation.dry_run {
        tracing::debug!("Dry run, not sending {} {}", request.method, request.uri);
        write_request(&request, out)?;
        return Ok(());
    }

    if invocation.verbose {
        write_request_echo(&request, log)?;
    }

    let session = connect(&credentials)?;
    let outcome = session.send(&request)?;

    render(&outcome, &credentials.server_root, &invocation.render, out)
}

/// Interactively replace the stored configuration.
pub fn run_configure<S, I, W>(store: &S, input: I, output: &mut W) -> Result<Configuration>
where
    S: ConfigReader + ConfigWriter,
    I: BufRead,
    W: Write,
{
    let current = match store.load() {
        Ok(current) => current,
        Err(e @ Error::InvalidConfiguration { .. }) => {
            tracing::warn!("Ignoring unreadable configuration: {}", e);
            None
        }
        Err(e) => return Err(e),
    };

    let config = prompt_configuration(input, &mut *output, current.as_ref())?;
    store.save(&config)?;
    Ok(config)
}

/// Print a request in full: request line, headers, then the body.
fn write_request<W: Write>(request: &OutgoingRequest, out: &mut W) -> Result<()> {
    writeln!(out, "{} {}", request.method, request.uri)?;
    for (name, value) in &request.headers {
        writeln!(out, "{name}: {value}")?;
    }
    if let Some(body) = &request.body {
        let value: Value = serde_json::from_str(body).unwrap_or(Value::String(body.clone()));
        let pretty = pretty_print_value(&value).unwrap_or_else(|_| body.clone());
        writeln!(out)?;
        writeln!(out, "{pretty}")?;
    }
    out.flush()?;
    Ok(())
}

fn write_request_echo<W: Write>(request: &OutgoingRequest, log: &mut W) -> Result<()> {
    writeln!(log, "Request: {} {}", request.method, request.uri)?;
    if !request.headers.is_empty() {
        writeln!(log, "Headers:")?;
        for (key, value) in &request.headers {
            writeln!(log, "  {key}: {value}")?;
        }
    }
    writeln!(log)?;
    Ok(())
}
