// src/errors.rs

//! Crate-level error type.
//!
//! Startup problems (config, package metadata, IO outside a task) surface as
//! [`SitepipeError`]. Failures inside tasks use `task::TaskError` instead, and
//! transform failures for a single file use `transform::TransformError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitepipeError {
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("package metadata: {0}")]
    PackageError(String),

    #[error("cannot parse config: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("cannot parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SitepipeError>;
