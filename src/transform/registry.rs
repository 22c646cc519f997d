// src/transform/registry.rs

//! Optional external capabilities, resolved once at startup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::transform::{ExternalCommand, Passthrough, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    CssPostprocess,
    JsTranspile,
    ImageOptimizer,
    HtmlBeautify,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::CssPostprocess,
        Capability::JsTranspile,
        Capability::ImageOptimizer,
        Capability::HtmlBeautify,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Capability::CssPostprocess => "css-postprocess",
            Capability::JsTranspile => "js-transpile",
            Capability::ImageOptimizer => "image-optimizer",
            Capability::HtmlBeautify => "html-beautify",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Every capability maps to a transform; unconfigured ones pass files through.
#[derive(Clone)]
pub struct TransformRegistry {
    entries: HashMap<Capability, Arc<dyn Transform>>,
    commands: HashMap<Capability, String>,
}

impl TransformRegistry {
    /// A registry where every capability is a passthrough.
    pub fn passthrough() -> Self {
        let entries = Capability::ALL
            .into_iter()
            .map(|cap| (cap, Arc::new(Passthrough::new(cap.id())) as Arc<dyn Transform>))
            .collect();
        Self {
            entries,
            commands: HashMap::new(),
        }
    }

    pub fn resolve(cfg: &ConfigFile) -> Self {
        let caps = cfg.capabilities();
        let mut registry = Self::passthrough();

        for (cap, command) in [
            (Capability::CssPostprocess, &caps.css_postprocess),
            (Capability::JsTranspile, &caps.js_transpile),
            (Capability::ImageOptimizer, &caps.image_optimizer),
            (Capability::HtmlBeautify, &caps.html_beautify),
        ] {
            match command {
                Some(cmd) => {
                    info!(capability = %cap, cmd = %cmd, "external capability configured");
                    registry.commands.insert(cap, cmd.clone());
                    registry
                        .entries
                        .insert(cap, Arc::new(ExternalCommand::new(cap.id(), cmd.clone())));
                }
                None => {
                    debug!(capability = %cap, "capability not configured; passing files through")
                }
            }
        }

        registry
    }

    /// Replace one capability. Used to inject transforms in tests.
    pub fn with_capability(mut self, cap: Capability, transform: Arc<dyn Transform>) -> Self {
        self.commands.remove(&cap);
        self.entries.insert(cap, transform);
        self
    }

    pub fn get(&self, cap: Capability) -> Arc<dyn Transform> {
        match self.entries.get(&cap) {
            Some(t) => Arc::clone(t),
            None => Arc::new(Passthrough::new(cap.id())),
        }
    }

    /// One line per capability, for `--dry-run`.
    pub fn describe(&self) -> Vec<String> {
        Capability::ALL
            .into_iter()
            .map(|cap| match self.commands.get(&cap) {
                Some(cmd) => format!("{cap}: {cmd}"),
                None => match self.get(cap).id() {
                    id if id == cap.id() => format!("{cap}: passthrough"),
                    id => format!("{cap}: {id} (in-process)"),
                },
            })
            .collect()
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}
