#![allow(dead_code)]

use std::sync::Arc;

use sitepipe::config::{ConfigFile, RawConfigFile};
use sitepipe::context::BuildContext;
use sitepipe::fs::mock::MockFileSystem;
use sitepipe::transform::{Capability, Transform, TransformRegistry};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn src(mut self, dir: &str) -> Self {
        self.config.paths.src = dir.to_string();
        self
    }

    pub fn dist(mut self, dir: &str) -> Self {
        self.config.paths.dist = dir.to_string();
        self
    }

    pub fn public(mut self, dir: &str) -> Self {
        self.config.paths.public = dir.to_string();
        self
    }

    pub fn html_page(mut self, pattern: &str) -> Self {
        self.config.paths.html_pages.push(pattern.to_string());
        self
    }

    pub fn capability(mut self, cap: Capability, cmd: &str) -> Self {
        let slot = match cap {
            Capability::CssPostprocess => &mut self.config.capabilities.css_postprocess,
            Capability::JsTranspile => &mut self.config.capabilities.js_transpile,
            Capability::ImageOptimizer => &mut self.config.capabilities.image_optimizer,
            Capability::HtmlBeautify => &mut self.config.capabilities.html_beautify,
        };
        *slot = Some(cmd.to_string());
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.config.watch.use_hash = val;
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub const PACKAGE_JSON: &str = r#"{
  "name": "demo-site",
  "version": "1.2.3",
  "description": "Demo site",
  "author": "Jane Doe",
  "homepage": "https://example.com",
  "license": "MIT"
}
"#;

/// In-memory project: a `MockFileSystem` seeded with `package.json` and
/// whatever source files the test adds, rooted at `.`.
pub struct ProjectBuilder {
    fs: MockFileSystem,
    config: ConfigFile,
    overrides: Vec<(Capability, Arc<dyn Transform>)>,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        let fs = MockFileSystem::new();
        fs.add_file("./package.json", PACKAGE_JSON);
        Self {
            fs,
            config: ConfigFileBuilder::new().build(),
            overrides: Vec::new(),
        }
    }

    pub fn config(mut self, config: ConfigFile) -> Self {
        self.config = config;
        self
    }

    /// Add a file; `path` is relative to the project root.
    pub fn file(self, path: &str, contents: &str) -> Self {
        self.fs.add_file(format!("./{path}"), contents);
        self
    }

    /// Replace a capability with an in-process transform.
    pub fn capability(mut self, cap: Capability, transform: Arc<dyn Transform>) -> Self {
        self.overrides.push((cap, transform));
        self
    }

    pub fn build(self) -> (MockFileSystem, Arc<BuildContext>) {
        let mut registry = TransformRegistry::resolve(&self.config);
        for (cap, transform) in self.overrides {
            registry = registry.with_capability(cap, transform);
        }
        let ctx = BuildContext::new(self.config, Arc::new(self.fs.clone()), registry);
        (self.fs, Arc::new(ctx))
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}
