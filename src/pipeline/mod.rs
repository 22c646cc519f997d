// src/pipeline/mod.rs

//! The fixed build pipeline and its watch bindings.
//!
//! ```text
//! build = series(clean, version, parallel(html, images, styles, scripts), publish)
//! publish = parallel(publish-public, publish-fonts)
//! ```

use crate::cli::EntryPoint;
use crate::config::ConfigFile;
use crate::task::{Task, parallel, series};

pub mod tasks;

pub use tasks::Layout;

/// Maps changes under `patterns` to the task that must re-run.
#[derive(Debug, Clone)]
pub struct WatchBinding {
    pub name: String,
    /// Globs relative to the project root.
    pub patterns: Vec<String>,
    pub task: Task,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    build: Task,
    clean: Task,
    version: Task,
    html: Task,
    images: Task,
    css_process: Task,
    styles: Task,
    js_process: Task,
    scripts: Task,
    publish: Task,
    bindings: Vec<WatchBinding>,
}

impl Pipeline {
    pub fn new(cfg: &ConfigFile) -> Self {
        let layout = Layout::from_config(cfg);

        let clean = tasks::clean();
        let version = tasks::version();
        let html = tasks::html(&layout);
        let images = tasks::images(&layout);
        let css_process = tasks::css_process(&layout);
        let styles = tasks::styles(&layout);
        let js_process = tasks::js_process(&layout);
        let scripts = tasks::scripts(&layout);
        let publish = parallel(
            "publish",
            vec![tasks::publish_public(&layout), tasks::publish_fonts(&layout)],
        );

        let build = series(
            "build",
            vec![
                clean.clone(),
                version.clone(),
                parallel(
                    "assets",
                    vec![html.clone(), images.clone(), styles.clone(), scripts.clone()],
                ),
                publish.clone(),
            ],
        );

        let bindings = vec![
            WatchBinding {
                name: "html".to_string(),
                patterns: vec![layout.src_dir("**/*.html")],
                task: html.clone(),
            },
            WatchBinding {
                name: "images".to_string(),
                patterns: vec![tasks::join(&layout.images_dir(), "**/*")],
                task: images.clone(),
            },
            WatchBinding {
                name: "styles".to_string(),
                patterns: vec![tasks::join(&layout.css_dir(), "**/*.css")],
                task: series("watch-styles", vec![css_process.clone(), styles.clone()]),
            },
            WatchBinding {
                name: "scripts".to_string(),
                patterns: vec![tasks::join(&layout.js_dir(), "**/*.js")],
                task: series("watch-scripts", vec![js_process.clone(), scripts.clone()]),
            },
            WatchBinding {
                name: "publish".to_string(),
                patterns: vec![
                    tasks::join(&layout.fonts_dir(), "**/*"),
                    tasks::join(&layout.public, "**/*"),
                ],
                task: publish.clone(),
            },
        ];

        Self {
            build,
            clean,
            version,
            html,
            images,
            css_process,
            styles,
            js_process,
            scripts,
            publish,
            bindings,
        }
    }

    /// Task behind a CLI entry point. `watch` is not a task; it returns `None`.
    pub fn task(&self, entry: EntryPoint) -> Option<&Task> {
        let task = match entry {
            EntryPoint::Build => &self.build,
            EntryPoint::Watch => return None,
            EntryPoint::Clean => &self.clean,
            EntryPoint::Html => &self.html,
            EntryPoint::Images => &self.images,
            EntryPoint::Styles => &self.styles,
            EntryPoint::Scripts => &self.scripts,
            EntryPoint::Version => &self.version,
            EntryPoint::Publish => &self.publish,
            EntryPoint::CssProcess => &self.css_process,
            EntryPoint::JsProcess => &self.js_process,
        };
        Some(task)
    }

    pub fn build(&self) -> &Task {
        &self.build
    }

    pub fn watch_bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }

    /// Human-readable task tree and bindings for `--dry-run`.
    pub fn describe(&self, entry: EntryPoint) -> Vec<String> {
        let mut lines = Vec::new();
        match self.task(entry) {
            Some(task) => lines.extend(task.describe()),
            None => {
                lines.push("initial build:".to_string());
                lines.extend(self.build.describe().into_iter().map(|l| format!("  {l}")));
                lines.push("watch bindings:".to_string());
                for binding in &self.bindings {
                    lines.push(format!(
                        "  {} [{}] -> {}",
                        binding.name,
                        binding.patterns.join(", "),
                        binding.task.name()
                    ));
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;

    fn pipeline() -> Pipeline {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        Pipeline::new(&cfg)
    }

    #[test]
    fn build_has_the_documented_shape() {
        assert_eq!(
            pipeline().build().describe(),
            vec![
                "build (series)",
                "  clean",
                "  version",
                "  assets (parallel)",
                "    html",
                "    images",
                "    styles",
                "    scripts",
                "  publish (parallel)",
                "    publish-public",
                "    publish-fonts",
            ]
        );
    }

    #[test]
    fn every_entry_point_but_watch_has_a_task() {
        let p = pipeline();
        for entry in [
            EntryPoint::Build,
            EntryPoint::Clean,
            EntryPoint::Html,
            EntryPoint::Images,
            EntryPoint::Styles,
            EntryPoint::Scripts,
            EntryPoint::Version,
            EntryPoint::Publish,
            EntryPoint::CssProcess,
            EntryPoint::JsProcess,
        ] {
            assert_eq!(p.task(entry).map(Task::name), Some(entry.as_str()));
        }
        assert!(p.task(EntryPoint::Watch).is_none());
    }

    #[test]
    fn watch_bindings_cover_sources() {
        let p = pipeline();
        let names: Vec<_> = p.watch_bindings().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["html", "images", "styles", "scripts", "publish"]);

        let publish = &p.watch_bindings()[4];
        assert_eq!(publish.patterns, vec!["src/assets/fonts/**/*", "public/**/*"]);

        let styles = &p.watch_bindings()[2];
        assert_eq!(
            styles.task.describe(),
            vec!["watch-styles (series)", "  css-process", "  styles"]
        );
    }
}
