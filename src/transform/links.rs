// src/transform/links.rs

//! Point HTML at minified assets: `href="a.css"` → `href="a.min.css"`,
//! `src="app.js"` → `src="app.min.js"`.
//!
//! References that are already `.min` or absolute `http(s)://` URLs are left
//! alone.

use regex::{Captures, Regex};

use crate::context::BuildContext;
use crate::transform::{Artifact, TextTransform, TransformError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Css,
    Js,
}

impl LinkKind {
    fn extension(self) -> &'static str {
        match self {
            LinkKind::Css => ".css",
            LinkKind::Js => ".js",
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            LinkKind::Css => r#"href\s*=\s*["']([^"']+\.css)["']"#,
            LinkKind::Js => r#"src\s*=\s*["']([^"']+\.js)["']"#,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetLinkRewrite {
    kind: LinkKind,
    id: &'static str,
    attribute: Regex,
}

impl AssetLinkRewrite {
    pub fn new(kind: LinkKind) -> Self {
        let id = match kind {
            LinkKind::Css => "rewrite-css-links",
            LinkKind::Js => "rewrite-js-links",
        };
        let attribute = Regex::new(kind.pattern()).expect("link attribute regex is valid");
        Self {
            kind,
            id,
            attribute,
        }
    }

    /// The `.min` variant of `path`, or `None` if it must stay as is.
    fn minified(&self, path: &str) -> Option<String> {
        let ext = self.kind.extension();
        let min_ext = format!(".min{ext}");
        if path.ends_with(&min_ext) || path.starts_with("http://") || path.starts_with("https://") {
            return None;
        }
        let stem = path.strip_suffix(ext)?;
        Some(format!("{stem}{min_ext}"))
    }
}

impl TextTransform for AssetLinkRewrite {
    fn id(&self) -> &str {
        self.id
    }

    fn transform_text(
        &self,
        text: &str,
        _artifact: &Artifact,
        _ctx: &BuildContext,
    ) -> Result<String, TransformError> {
        let out = self.attribute.replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            match self.minified(&caps[1]) {
                Some(min) => whole.replacen(&caps[1], &min, 1),
                None => whole.to_string(),
            }
        });
        Ok(out.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn rewrite(kind: LinkKind, html: &str) -> String {
        let ctx = BuildContext::with_defaults(Arc::new(MockFileSystem::new()));
        let artifact = Artifact {
            source: PathBuf::from("./src/index.html"),
            relative: PathBuf::from("index.html"),
            contents: html.as_bytes().to_vec(),
        };
        AssetLinkRewrite::new(kind)
            .transform_text(html, &artifact, &ctx)
            .unwrap()
    }

    #[test]
    fn local_stylesheets_point_at_min() {
        let html = r#"<link rel="stylesheet" href="assets/css/style.css"><link href = 'https://cdn.example.com/a.css'>"#;
        assert_eq!(
            rewrite(LinkKind::Css, html),
            r#"<link rel="stylesheet" href="assets/css/style.min.css"><link href = 'https://cdn.example.com/a.css'>"#
        );
    }

    #[test]
    fn already_minified_is_untouched() {
        let html = r#"<link href="a.min.css"><script src="b.min.js"></script>"#;
        assert_eq!(rewrite(LinkKind::Css, html), html);
        assert_eq!(rewrite(LinkKind::Js, html), html);
    }

    #[test]
    fn scripts_point_at_min() {
        let html = r#"<script src="assets/js/app.js"></script><script src="http://x.test/lib.js"></script>"#;
        assert_eq!(
            rewrite(LinkKind::Js, html),
            r#"<script src="assets/js/app.min.js"></script><script src="http://x.test/lib.js"></script>"#
        );
    }
}
