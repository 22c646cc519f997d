// src/task/stream.rs

//! Stream tasks: select source files, push each through a transform chain,
//! write the results below a destination directory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use crate::context::BuildContext;
use crate::sources::{build_globset, collect_matching_files};
use crate::task::{Action, ErrorReporter, TaskError, TaskResult};
use crate::transform::{Artifact, BoxFuture, Transform, TransformError};

/// Builds the transform chain for one invocation. Called on every run so
/// inputs such as package metadata are read fresh.
pub type ChainBuilder =
    Arc<dyn Fn(&BuildContext) -> anyhow::Result<Vec<Arc<dyn Transform>>> + Send + Sync>;

/// Which files a stream task reads.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    /// Globs relative to the project root.
    pub patterns: Vec<String>,
    /// Directory (relative to the root) the walk starts from. Output paths
    /// are relative to it.
    pub base: PathBuf,
}

impl SourceSpec {
    pub fn new<S: Into<String>>(
        base: impl Into<PathBuf>,
        patterns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            base: base.into(),
        }
    }
}

#[derive(Clone)]
pub struct StreamTask {
    name: String,
    sources: SourceSpec,
    /// Destination directory relative to the project root.
    dest: PathBuf,
    chain: ChainBuilder,
}

impl std::fmt::Debug for StreamTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamTask")
            .field("name", &self.name)
            .field("sources", &self.sources)
            .field("dest", &self.dest)
            .finish_non_exhaustive()
    }
}

impl StreamTask {
    pub fn new(
        name: impl Into<String>,
        sources: SourceSpec,
        dest: impl Into<PathBuf>,
        chain: ChainBuilder,
    ) -> Self {
        Self {
            name: name.into(),
            sources,
            dest: dest.into(),
            chain,
        }
    }

    /// A stream task that copies files unchanged.
    pub fn copy(name: impl Into<String>, sources: SourceSpec, dest: impl Into<PathBuf>) -> Self {
        let chain: ChainBuilder = Arc::new(|_ctx: &BuildContext| Ok(Vec::new()));
        Self::new(name, sources, dest, chain)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &SourceSpec {
        &self.sources
    }

    /// Run once, returning how many files were written.
    pub async fn execute(&self, ctx: &BuildContext) -> Result<usize, TaskError> {
        let fail = |e: anyhow::Error| TaskError::failed(&self.name, e);

        let globset = build_globset(&self.sources.patterns).map_err(fail)?;
        let root = ctx.root();
        let base = root.join(&self.sources.base);
        let files = collect_matching_files(ctx.fs(), root, &base, |rel| globset.is_match(rel))
            .with_context(|| format!("selecting sources under {}", base.display()))
            .map_err(fail)?;

        if files.is_empty() {
            debug!(task = %self.name, base = %base.display(), "no matching source files");
            return Ok(0);
        }

        let chain = (self.chain)(ctx).map_err(fail)?;
        let dest = root.join(&self.dest);
        let mut reporter = ErrorReporter::new(&self.name);
        let mut written = 0;

        for path in files {
            let contents = ctx.fs().read(&path).map_err(fail)?;
            let relative = path
                .strip_prefix(&base)
                .map(|p| p.to_path_buf())
                .with_context(|| format!("{} is outside {}", path.display(), base.display()))
                .map_err(fail)?;
            let artifact = Artifact {
                source: path.clone(),
                relative,
                contents,
            };

            match apply_chain(&chain, artifact, ctx).await {
                Ok(out) => {
                    let target = dest.join(&out.relative);
                    ctx.fs().write(&target, &out.contents).map_err(fail)?;
                    debug!(
                        task = %self.name,
                        src = %path.display(),
                        dest = %target.display(),
                        "wrote"
                    );
                    written += 1;
                }
                Err(err) => reporter.report(err.with_file(&path)),
            }
        }

        let failed = reporter.failures().len();
        info!(task = %self.name, written, failed, "processed files");
        reporter.finish()?;
        Ok(written)
    }
}

async fn apply_chain(
    chain: &[Arc<dyn Transform>],
    mut artifact: Artifact,
    ctx: &BuildContext,
) -> Result<Artifact, TransformError> {
    for transform in chain {
        artifact = transform.apply(artifact, ctx).await?;
    }
    Ok(artifact)
}

impl Action for StreamTask {
    fn run(&self, ctx: Arc<BuildContext>) -> BoxFuture<'static, TaskResult> {
        let this = self.clone();
        Box::pin(async move { this.execute(&ctx).await.map(|_| ()) })
    }
}
