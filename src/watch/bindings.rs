// src/watch/bindings.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::GlobSet;

use crate::config::WatchSection;
use crate::engine::BindingName;
use crate::pipeline::WatchBinding;
use crate::sources::build_globset;

/// Compiled glob patterns for a single watch binding.
///
/// Patterns are relative to the project root; the watcher passes relative
/// paths (e.g. `"src/assets/css/a.css"`) into [`BindingProfile::matches`].
#[derive(Clone)]
pub struct BindingProfile {
    name: BindingName,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
    use_hash: bool,
}

impl fmt::Debug for BindingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingProfile")
            .field("name", &self.name)
            .field("use_hash", &self.use_hash)
            .finish_non_exhaustive()
    }
}

impl BindingProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this binding only triggers on content changes.
    pub fn use_hash(&self) -> bool {
        self.use_hash
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Compile one profile per binding. `[watch] exclude` applies to all of them.
pub fn build_binding_profiles(
    bindings: &[WatchBinding],
    watch: &WatchSection,
) -> Result<Vec<BindingProfile>> {
    let exclude_set = if watch.exclude.is_empty() {
        None
    } else {
        Some(build_globset(&watch.exclude).context("building [watch].exclude globset")?)
    };

    bindings
        .iter()
        .map(|binding| {
            let watch_set = build_globset(&binding.patterns).with_context(|| {
                format!("building watch globset for binding {}", binding.name)
            })?;
            Ok(BindingProfile {
                name: binding.name.clone(),
                watch_set,
                exclude_set: exclude_set.clone(),
                use_hash: watch.use_hash,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFile, RawConfigFile};
    use crate::pipeline::Pipeline;

    fn profiles(exclude: &[&str]) -> Vec<BindingProfile> {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        let pipeline = Pipeline::new(&cfg);
        let watch = WatchSection {
            use_hash: false,
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
        };
        build_binding_profiles(pipeline.watch_bindings(), &watch).unwrap()
    }

    fn matching(profiles: &[BindingProfile], rel: &str) -> Vec<String> {
        profiles
            .iter()
            .filter(|p| p.matches(rel))
            .map(|p| p.name().to_string())
            .collect()
    }

    #[test]
    fn paths_map_to_bindings() {
        let p = profiles(&[]);
        assert_eq!(matching(&p, "src/index.html"), vec!["html"]);
        assert_eq!(matching(&p, "src/partials/nav.html"), vec!["html"]);
        assert_eq!(matching(&p, "src/assets/css/a.css"), vec!["styles"]);
        assert_eq!(matching(&p, "src/assets/js/app.js"), vec!["scripts"]);
        assert_eq!(matching(&p, "src/assets/images/logo.png"), vec!["images"]);
        assert_eq!(matching(&p, "src/assets/fonts/a.woff2"), vec!["publish"]);
        assert_eq!(matching(&p, "public/robots.txt"), vec!["publish"]);
        assert!(matching(&p, "dist/index.html").is_empty());
    }

    #[test]
    fn global_exclude_wins() {
        let p = profiles(&["**/*.swp"]);
        assert!(matching(&p, "src/assets/css/.a.css.swp").is_empty());
        assert!(matching(&p, "public/x.swp").is_empty());
        assert_eq!(matching(&p, "public/x.txt"), vec!["publish"]);
    }
}
