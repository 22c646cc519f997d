// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `sitepipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitepipe",
    version,
    about = "Build static-site assets: HTML includes, CSS/JS, images, fonts and public files.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run. Defaults to the full `build` pipeline.
    #[arg(value_enum, default_value_t = EntryPoint::Build)]
    pub task: EntryPoint,

    /// Path to the config file (TOML).
    ///
    /// The directory containing it is the project root. A missing
    /// `Sitepipe.toml` in the current directory means "use defaults".
    #[arg(long, value_name = "PATH", default_value = "Sitepipe.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task tree and watch bindings, run nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Named entry points of the pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum EntryPoint {
    /// clean → version → {html, images, styles, scripts} → publish
    Build,
    /// Build once, then rebuild affected parts on file changes.
    Watch,
    Clean,
    Html,
    Images,
    Styles,
    Scripts,
    Version,
    Publish,
    /// Non-minified CSS with banner.
    CssProcess,
    /// Non-minified JS with banner.
    JsProcess,
}

impl EntryPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Build => "build",
            EntryPoint::Watch => "watch",
            EntryPoint::Clean => "clean",
            EntryPoint::Html => "html",
            EntryPoint::Images => "images",
            EntryPoint::Styles => "styles",
            EntryPoint::Scripts => "scripts",
            EntryPoint::Version => "version",
            EntryPoint::Publish => "publish",
            EntryPoint::CssProcess => "css-process",
            EntryPoint::JsProcess => "js-process",
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
