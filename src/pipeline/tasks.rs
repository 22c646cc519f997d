// src/pipeline/tasks.rs

//! Leaf task definitions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::ConfigFile;
use crate::context::BuildContext;
use crate::package;
use crate::task::{ChainBuilder, SourceSpec, StreamTask, Task};
use crate::transform::{
    AssetLinkRewrite, Banner, Capability, CssMinify, FileInclude, JsMinify, LinkKind, Suffix,
    Transform,
};

/// Project-relative directories the leaf tasks read from and write to.
#[derive(Debug, Clone)]
pub struct Layout {
    pub src: String,
    pub dist: String,
    pub public: String,
    pub html_pages: Vec<String>,
}

impl Layout {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let paths = cfg.paths();
        Self {
            src: clean_dir(&paths.src),
            dist: clean_dir(&paths.dist),
            public: clean_dir(&paths.public),
            html_pages: paths.html_pages.clone(),
        }
    }

    pub fn src_dir(&self, sub: &str) -> String {
        join(&self.src, sub)
    }

    pub fn dist_dir(&self, sub: &str) -> PathBuf {
        Path::new(&self.dist).join(sub)
    }

    pub fn css_dir(&self) -> String {
        self.src_dir("assets/css")
    }

    pub fn js_dir(&self) -> String {
        self.src_dir("assets/js")
    }

    pub fn images_dir(&self) -> String {
        self.src_dir("assets/images")
    }

    pub fn fonts_dir(&self) -> String {
        self.src_dir("assets/fonts")
    }
}

/// Strip a leading `./` and trailing `/` so the directory can prefix globs.
fn clean_dir(dir: &str) -> String {
    let dir = dir.trim_start_matches("./").trim_end_matches('/');
    if dir.is_empty() { ".".to_string() } else { dir.to_string() }
}

/// `dir/rest` as a glob; `.` contributes nothing.
pub(crate) fn join(dir: &str, rest: &str) -> String {
    if dir == "." {
        rest.to_string()
    } else {
        format!("{dir}/{rest}")
    }
}

fn chain<F>(f: F) -> ChainBuilder
where
    F: Fn(&BuildContext) -> anyhow::Result<Vec<Arc<dyn Transform>>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Banner stamped with the package metadata as it is on disk right now.
fn banner(ctx: &BuildContext) -> anyhow::Result<Arc<dyn Transform>> {
    let path = ctx.package_path();
    let pkg = package::load(ctx.fs(), &path)
        .with_context(|| format!("reading package metadata from {}", path.display()))?;
    Ok(Arc::new(Banner::new(package::banner_now(&pkg))))
}

pub fn clean() -> Task {
    Task::from_fn("clean", |ctx| async move {
        let dist = ctx.dist_dir();
        ctx.fs()
            .remove_dir_all(&dist)
            .with_context(|| format!("removing {}", dist.display()))?;
        info!(path = %dist.display(), "output directory removed");
        Ok(())
    })
}

pub fn version() -> Task {
    Task::from_fn("version", |ctx| async move {
        package::bump_package_file(ctx.fs(), &ctx.package_path())?;
        Ok(())
    })
}

pub fn html(layout: &Layout) -> Task {
    let patterns = layout.html_pages.iter().map(|p| layout.src_dir(p));
    Task::stream(StreamTask::new(
        "html",
        SourceSpec::new(&layout.src, patterns),
        layout.dist_dir(""),
        chain(|ctx| {
            Ok(vec![
                Arc::new(FileInclude::new()) as Arc<dyn Transform>,
                ctx.registry().get(Capability::HtmlBeautify),
                Arc::new(AssetLinkRewrite::new(LinkKind::Css)),
                Arc::new(AssetLinkRewrite::new(LinkKind::Js)),
            ])
        }),
    ))
}

pub fn images(layout: &Layout) -> Task {
    let dir = layout.images_dir();
    Task::stream(StreamTask::new(
        "images",
        SourceSpec::new(&dir, [join(&dir, "**/*")]),
        layout.dist_dir("assets/images"),
        chain(|ctx| Ok(vec![ctx.registry().get(Capability::ImageOptimizer)])),
    ))
}

/// Post-processed CSS with banner, not minified.
pub fn css_process(layout: &Layout) -> Task {
    let dir = layout.css_dir();
    Task::stream(StreamTask::new(
        "css-process",
        SourceSpec::new(&dir, [join(&dir, "**/*.css")]),
        layout.dist_dir("assets/css"),
        chain(|ctx| Ok(vec![ctx.registry().get(Capability::CssPostprocess), banner(ctx)?])),
    ))
}

pub fn styles(layout: &Layout) -> Task {
    let dir = layout.css_dir();
    Task::stream(StreamTask::new(
        "styles",
        SourceSpec::new(&dir, [join(&dir, "**/*.css")]),
        layout.dist_dir("assets/css"),
        chain(|ctx| {
            Ok(vec![
                ctx.registry().get(Capability::CssPostprocess),
                Arc::new(CssMinify::new()),
                banner(ctx)?,
                Arc::new(Suffix::new(".min")),
            ])
        }),
    ))
}

/// Transpiled JS with banner, not minified.
pub fn js_process(layout: &Layout) -> Task {
    let dir = layout.js_dir();
    Task::stream(StreamTask::new(
        "js-process",
        SourceSpec::new(&dir, [join(&dir, "**/*.js")]),
        layout.dist_dir("assets/js"),
        chain(|ctx| Ok(vec![ctx.registry().get(Capability::JsTranspile), banner(ctx)?])),
    ))
}

pub fn scripts(layout: &Layout) -> Task {
    let dir = layout.js_dir();
    Task::stream(StreamTask::new(
        "scripts",
        SourceSpec::new(&dir, [join(&dir, "**/*.js")]),
        layout.dist_dir("assets/js"),
        chain(|ctx| {
            Ok(vec![
                ctx.registry().get(Capability::JsTranspile),
                Arc::new(JsMinify::new()),
                banner(ctx)?,
                Arc::new(Suffix::new(".min")),
            ])
        }),
    ))
}

pub fn publish_public(layout: &Layout) -> Task {
    Task::stream(StreamTask::copy(
        "publish-public",
        SourceSpec::new(&layout.public, [join(&layout.public, "**/*")]),
        layout.dist_dir(""),
    ))
}

pub fn publish_fonts(layout: &Layout) -> Task {
    let dir = layout.fonts_dir();
    Task::stream(StreamTask::copy(
        "publish-fonts",
        SourceSpec::new(&dir, [join(&dir, "**/*")]),
        layout.dist_dir("assets/fonts"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_normalizes_directories() {
        assert_eq!(clean_dir("./src/"), "src");
        assert_eq!(clean_dir("./"), ".");
        assert_eq!(join(".", "**/*"), "**/*");
        assert_eq!(join("web/src", "assets/css"), "web/src/assets/css");
    }
}
