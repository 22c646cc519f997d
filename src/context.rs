// src/context.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigFile, RawConfigFile};
use crate::fs::FileSystem;
use crate::transform::TransformRegistry;

/// Everything a task needs at run time: the validated config, the filesystem
/// seam and the capability registry. Shared across tasks behind an `Arc`.
#[derive(Debug, Clone)]
pub struct BuildContext {
    config: ConfigFile,
    fs: Arc<dyn FileSystem>,
    registry: TransformRegistry,
}

impl BuildContext {
    pub fn new(config: ConfigFile, fs: Arc<dyn FileSystem>, registry: TransformRegistry) -> Self {
        Self {
            config,
            fs,
            registry,
        }
    }

    /// Default configuration rooted at `.`, no external capabilities.
    pub fn with_defaults(fs: Arc<dyn FileSystem>) -> Self {
        let raw = RawConfigFile::default();
        let config = ConfigFile::new_unchecked(raw.paths, raw.capabilities, raw.watch);
        Self::new(config, fs, TransformRegistry::passthrough())
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    pub fn root(&self) -> &Path {
        self.config.root()
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.config.dist_dir()
    }

    pub fn package_path(&self) -> PathBuf {
        self.config.package_path()
    }

    pub fn design_tokens_path(&self) -> PathBuf {
        self.config.root().join(&self.config.paths().design_tokens)
    }

    /// Replace the registry, keeping config and filesystem.
    pub fn with_registry(mut self, registry: TransformRegistry) -> Self {
        self.registry = registry;
        self
    }
}
