use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{CliError, Result};

/// Initialize a tracing subscriber writing to stderr.
///
/// `--verbose` forces `debug`. Otherwise `RUST_LOG` applies when set and
/// valid, falling back to `info`. Stdout stays reserved for the report so
/// `--json` output remains parseable.
pub fn init(verbose: bool) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true)
        .compact();

    let filter_layer = filter(verbose, std::env::var("RUST_LOG").ok().as_deref())?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    Ok(())
}

fn filter(verbose: bool, rust_log: Option<&str>) -> Result<EnvFilter> {
    if verbose {
        return EnvFilter::try_new("debug").map_err(|e| CliError::Logging(e.to_string()));
    }
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .map_or_else(
            || EnvFilter::try_new("info").map_err(|e| CliError::Logging(e.to_string())),
            Ok,
        )
}
