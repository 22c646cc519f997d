// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration exactly as read from `Sitepipe.toml`.
///
/// ```toml
/// [paths]
/// src = "src"
/// dist = "dist"
///
/// [capabilities]
/// css_postprocess = "npx tailwindcss -c {design_tokens} -i {file}"
///
/// [watch]
/// use_hash = true
/// ```
///
/// All sections are optional and have reasonable defaults. Use
/// [`ConfigFile::try_from`] to obtain a validated configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub capabilities: CapabilitiesSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration plus the project root it applies to.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    root: PathBuf,
    paths: PathsSection,
    capabilities: CapabilitiesSection,
    watch: WatchSection,
}

impl ConfigFile {
    /// Assemble a config without validation. Only `validate.rs` calls this.
    pub(crate) fn new_unchecked(
        paths: PathsSection,
        capabilities: CapabilitiesSection,
        watch: WatchSection,
    ) -> Self {
        Self {
            root: PathBuf::from("."),
            paths,
            capabilities,
            watch,
        }
    }

    /// Re-anchor all relative paths at `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn paths(&self) -> &PathsSection {
        &self.paths
    }

    pub fn capabilities(&self) -> &CapabilitiesSection {
        &self.capabilities
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }

    /// Absolute (root-joined) location of the output tree.
    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(&self.paths.dist)
    }

    /// Absolute (root-joined) location of `package.json`.
    pub fn package_path(&self) -> PathBuf {
        self.root.join(&self.paths.package)
    }
}

/// `[paths]` section. Every entry is relative to the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsSection {
    #[serde(default = "default_src")]
    pub src: String,

    #[serde(default = "default_dist")]
    pub dist: String,

    #[serde(default = "default_public")]
    pub public: String,

    /// Package metadata file (name, version, author, ...).
    #[serde(default = "default_package")]
    pub package: String,

    /// Design-token settings handed to the CSS post-process capability.
    #[serde(default = "default_design_tokens")]
    pub design_tokens: String,

    /// HTML pages to build, relative to `src`. Partials outside these
    /// patterns are only reachable through `@@include`.
    #[serde(default = "default_html_pages")]
    pub html_pages: Vec<String>,
}

fn default_src() -> String {
    "src".to_string()
}

fn default_dist() -> String {
    "dist".to_string()
}

fn default_public() -> String {
    "public".to_string()
}

fn default_package() -> String {
    "package.json".to_string()
}

fn default_design_tokens() -> String {
    "tailwind.config.js".to_string()
}

fn default_html_pages() -> Vec<String> {
    vec!["*.html".to_string(), "en/**/*.html".to_string()]
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            dist: default_dist(),
            public: default_public(),
            package: default_package(),
            design_tokens: default_design_tokens(),
            html_pages: default_html_pages(),
        }
    }
}

/// `[capabilities]` section.
///
/// Each entry is a shell command that reads one file on stdin and writes the
/// transformed file to stdout. `{file}` and `{design_tokens}` are substituted
/// before spawning. Unset capabilities pass files through unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilitiesSection {
    #[serde(default)]
    pub css_postprocess: Option<String>,

    #[serde(default)]
    pub js_transpile: Option<String>,

    #[serde(default)]
    pub image_optimizer: Option<String>,

    /// Re-indents built HTML pages before their links are rewritten.
    #[serde(default)]
    pub html_beautify: Option<String>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Only trigger a binding when the content of its watched files changed.
    #[serde(default)]
    pub use_hash: bool,

    /// Globs (relative to the root) that never trigger any binding.
    #[serde(default)]
    pub exclude: Vec<String>,
}
