// src/transform/mod.rs

//! File transforms applied by stream tasks.
//!
//! A [`Transform`] maps one [`Artifact`] to one artifact. Most built-in
//! transforms are plain text rewrites and implement [`TextTransform`]
//! instead; a blanket impl adapts them. Heavy processing (design-token CSS,
//! JS transpilation, image optimization) is delegated to external commands
//! resolved once at startup by the [`registry`].
//!
//! - [`include`]: `@@include(...)` expansion for HTML.
//! - [`links`]: rewrite local `.css`/`.js` references to their `.min` variants.
//! - [`css`] / [`js`]: conservative minifiers.
//! - [`banner`]: prepend the package banner.
//! - [`rename`]: add a suffix before the extension.
//! - [`external`]: stdin → stdout shell command capability.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use thiserror::Error;

use crate::context::BuildContext;

pub mod banner;
pub mod css;
pub mod external;
pub mod include;
pub mod js;
pub mod links;
pub mod registry;
pub mod rename;

pub use banner::Banner;
pub use css::CssMinify;
pub use external::ExternalCommand;
pub use include::FileInclude;
pub use js::JsMinify;
pub use links::{AssetLinkRewrite, LinkKind};
pub use registry::{Capability, TransformRegistry};
pub use rename::Suffix;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A file flowing through a stream task.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Where the file was read from.
    pub source: PathBuf,
    /// Output location relative to the task's destination directory.
    pub relative: PathBuf,
    pub contents: Vec<u8>,
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("source", &self.source)
            .field("relative", &self.relative)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// Failure raised by a transform for a single file.
#[derive(Debug, Clone, Error)]
#[error("{plugin}: {message}")]
pub struct TransformError {
    /// Identifier of the transform that failed (e.g. `css-minify`).
    pub plugin: String,
    pub message: String,
    /// Source excerpt pointing at the failure, when the transform knows it.
    pub code_frame: Option<String>,
    pub file: Option<PathBuf>,
}

impl TransformError {
    pub fn new(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            message: message.into(),
            code_frame: None,
            file: None,
        }
    }

    pub fn with_code_frame(mut self, frame: String) -> Self {
        self.code_frame = Some(frame);
        self
    }

    /// Attach the file the error belongs to, unless one is already set.
    pub fn with_file(mut self, file: &Path) -> Self {
        if self.file.is_none() {
            self.file = Some(file.to_path_buf());
        }
        self
    }
}

/// One step of a stream task's chain.
pub trait Transform: Send + Sync {
    /// Stable identifier used in logs and error reports.
    fn id(&self) -> &str;

    fn apply<'a>(
        &'a self,
        artifact: Artifact,
        ctx: &'a BuildContext,
    ) -> BoxFuture<'a, Result<Artifact, TransformError>>;
}

/// A synchronous UTF-8 text rewrite.
pub trait TextTransform: Send + Sync {
    fn id(&self) -> &str;

    fn transform_text(
        &self,
        text: &str,
        artifact: &Artifact,
        ctx: &BuildContext,
    ) -> Result<String, TransformError>;
}

impl<T: TextTransform> Transform for T {
    fn id(&self) -> &str {
        TextTransform::id(self)
    }

    fn apply<'a>(
        &'a self,
        mut artifact: Artifact,
        ctx: &'a BuildContext,
    ) -> BoxFuture<'a, Result<Artifact, TransformError>> {
        Box::pin(async move {
            let text = std::str::from_utf8(&artifact.contents).map_err(|e| {
                TransformError::new(TextTransform::id(self), format!("not valid UTF-8: {e}"))
            })?;
            let out = self.transform_text(text, &artifact, ctx)?;
            artifact.contents = out.into_bytes();
            Ok(artifact)
        })
    }
}

/// Forwards files unchanged. Stands in for capabilities that are not
/// configured.
#[derive(Debug, Clone)]
pub struct Passthrough {
    id: String,
}

impl Passthrough {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Transform for Passthrough {
    fn id(&self) -> &str {
        &self.id
    }

    fn apply<'a>(
        &'a self,
        artifact: Artifact,
        _ctx: &'a BuildContext,
    ) -> BoxFuture<'a, Result<Artifact, TransformError>> {
        Box::pin(async move { Ok(artifact) })
    }
}

/// Render a one-line excerpt of `source` with a caret under byte `offset`.
///
/// ```text
///   3 | body { color: "red }
///     |               ^
/// ```
pub fn code_frame(source: &str, offset: usize) -> String {
    let offset = offset.min(source.len());
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(source.len());
    let line_no = source[..line_start].matches('\n').count() + 1;
    let column = source[line_start..offset].chars().count();

    let gutter = line_no.to_string();
    let pad = " ".repeat(gutter.len());
    format!(
        "{gutter} | {}\n{pad} | {}^",
        &source[line_start..line_end],
        " ".repeat(column)
    )
}
