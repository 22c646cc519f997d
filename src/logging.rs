// src/logging.rs

//! Logging setup for `sitepipe` using `tracing` + `tracing-subscriber`.
//!
//! Filter resolution:
//! 1. `--log-level` sets a global level.
//! 2. Otherwise `SITEPIPE_LOG` is read as a full `EnvFilter` directive
//!    string, e.g. `debug` or `sitepipe::watch=trace,info`.
//! 3. Otherwise `info`.
//!
//! Third-party crates (the file watcher in particular) are capped at `warn`
//! unless a directive names them. Logs go to stderr so stdout stays free for
//! `--dry-run` output.

use anyhow::{Context, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

const ENV_VAR: &str = "SITEPIPE_LOG";
const QUIET_DEPENDENCIES: &[&str] = &["notify=warn", "globset=warn"];

/// Initialise the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let directives = match cli_level {
        Some(lvl) => level_name(lvl).to_string(),
        None => std::env::var(ENV_VAR).unwrap_or_else(|_| "info".to_string()),
    };
    let filter = build_filter(&directives).with_context(|| {
        format!("invalid log filter '{directives}' (from {ENV_VAR} or --log-level)")
    })?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn build_filter(directives: &str) -> Result<EnvFilter> {
    let mut filter = EnvFilter::builder().parse(directives.trim())?;
    for dep in QUIET_DEPENDENCIES {
        let crate_name = dep.split('=').next().unwrap_or(dep);
        if !directives.contains(crate_name) {
            filter = filter.add_directive(dep.parse::<Directive>()?);
        }
    }
    Ok(filter)
}

fn level_name(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
