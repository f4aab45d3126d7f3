//! # macline Main Entry Point
//!
//! Parses arguments, sets up logging and runs one invocation.

use anyhow::{Context, Result};
use macline::cmd::{run_configure, run_request, Invocation};
use macline::cmd_args::CommandLineArgs;
use macline::config::{get_config_path, FileConfigStore};
use macline::{Error, MacSession};
use std::io::{self, Write};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log level
const LOG_LEVEL_ENV_VAR: &str = "MACLINE_LOG_LEVEL";

fn main() {
    let args = CommandLineArgs::parse();
    init_tracing(args.verbose());

    let code = match run(&args) {
        Ok(()) => 0,
        Err(e) => report(&e),
    };
    std::process::exit(code);
}

fn run(args: &CommandLineArgs) -> Result<()> {
    let store = FileConfigStore::new(get_config_path(args.config()));

    if args.configure() {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        run_configure(&store, stdin.lock(), &mut stdout)
            .with_context(|| format!("Failed to configure {}", store.path().display()))?;
        writeln!(stdout, "Configuration saved to {}", store.path().display())
            .map_err(Error::from)?;
        return Ok(());
    }

    let invocation = Invocation::from_args(args)?;
    let mut stdout = io::stdout().lock();
    // Unlocked: the tracing writer on reqwest's worker thread shares stderr.
    let mut stderr = io::stderr();
    run_request(&invocation, &store, MacSession::new, &mut stdout, &mut stderr)?;
    Ok(())
}

/// Print the error and pick the exit code. A closed output pipe counts
/// as success.
fn report(e: &anyhow::Error) -> i32 {
    match e.chain().find_map(|cause| cause.downcast_ref::<Error>()) {
        Some(err) if err.is_broken_pipe() => 0,
        Some(err) => {
            eprintln!("macline: {e:#}");
            err.exit_code()
        }
        None => {
            eprintln!("macline: {e:#}");
            1
        }
    }
}

fn init_tracing(verbose: bool) {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_LEVEL_ENV_VAR)
        .from_env_lossy();
    if verbose {
        filter = filter.add_directive(directive("macline=debug"));
    }
    for quiet in ["reqwest=warn", "hyper=warn", "hyper_util=warn", "rustls=warn"] {
        filter = filter.add_directive(directive(quiet));
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    tracing::debug!("Tracing initialized");
}

fn directive(text: &'static str) -> Directive {
    text.parse()
        .unwrap_or_else(|_| Directive::from(LevelFilter::WARN))
}
