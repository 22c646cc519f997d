// src/transform/external.rs

use crate::context::BuildContext;
use crate::exec::command::run_filter;
use crate::transform::{Artifact, BoxFuture, Transform, TransformError};

/// A capability backed by a shell command reading the file on stdin and
/// writing the result to stdout.
///
/// `{file}` is replaced by the source path and `{design_tokens}` by the
/// configured design-token file before the command is spawned.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    id: String,
    command: String,
}

impl ExternalCommand {
    pub fn new(id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn render(&self, artifact: &Artifact, ctx: &BuildContext) -> String {
        self.command
            .replace("{file}", &artifact.source.display().to_string())
            .replace(
                "{design_tokens}",
                &ctx.design_tokens_path().display().to_string(),
            )
    }
}

impl Transform for ExternalCommand {
    fn id(&self) -> &str {
        &self.id
    }

    fn apply<'a>(
        &'a self,
        mut artifact: Artifact,
        ctx: &'a BuildContext,
    ) -> BoxFuture<'a, Result<Artifact, TransformError>> {
        Box::pin(async move {
            let cmdline = self.render(&artifact, ctx);
            let input = std::mem::take(&mut artifact.contents);
            artifact.contents = run_filter(&self.id, &cmdline, input)
                .await
                .map_err(|e| {
                    TransformError::new(&self.id, format!("{e:#}")).with_file(&artifact.source)
                })?;
            Ok(artifact)
        })
    }
}
