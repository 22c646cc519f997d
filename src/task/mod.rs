// src/task/mod.rs

//! Task model and composition.
//!
//! A [`Task`] is either a leaf wrapping an [`Action`], or a `series` /
//! `parallel` composite of other tasks. Running a task yields a future that
//! resolves to `Ok(())` or a [`TaskError`] describing which leaves failed and
//! how the failure propagated through the composites.
//!
//! - [`compose`]: `series` / `parallel` semantics.
//! - [`stream`]: file-selecting leaf tasks that run a transform chain.
//! - [`report`]: per-task collection of transform failures.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{error, info};

use crate::context::BuildContext;
use crate::transform::BoxFuture;

pub mod compose;
pub mod report;
pub mod stream;

pub use compose::{parallel, series};
pub use report::ErrorReporter;
pub use stream::{ChainBuilder, SourceSpec, StreamTask};

pub type TaskResult = Result<(), TaskError>;

/// Failure of a task, possibly wrapping failures of its children.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task '{task}' failed: {error:#}")]
    Failed { task: String, error: anyhow::Error },

    #[error("task '{task}': {failures} file(s) failed to transform")]
    TransformFailures { task: String, failures: usize },

    #[error("'{series}' stopped after '{child}' failed")]
    Series {
        series: String,
        child: String,
        #[source]
        cause: Box<TaskError>,
    },

    #[error("'{name}': {} of {total} task(s) failed ({})", .failures.len(), summarize(.failures))]
    Parallel {
        name: String,
        total: usize,
        failures: Vec<TaskError>,
    },

    #[error("task '{task}' panicked")]
    Panicked { task: String },
}

fn summarize(failures: &[TaskError]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl TaskError {
    pub fn failed(task: impl Into<String>, error: impl Into<anyhow::Error>) -> Self {
        TaskError::Failed {
            task: task.into(),
            error: error.into(),
        }
    }

    /// Names of the leaf tasks at the bottom of this failure, in order.
    pub fn failed_leaves(&self) -> Vec<&str> {
        match self {
            TaskError::Failed { task, .. }
            | TaskError::TransformFailures { task, .. }
            | TaskError::Panicked { task } => vec![task.as_str()],
            TaskError::Series { cause, .. } => cause.failed_leaves(),
            TaskError::Parallel { failures, .. } => {
                failures.iter().flat_map(|f| f.failed_leaves()).collect()
            }
        }
    }
}

/// The work done by a leaf task.
pub trait Action: Send + Sync {
    fn run(&self, ctx: Arc<BuildContext>) -> BoxFuture<'static, TaskResult>;
}

type ActionFn = dyn Fn(Arc<BuildContext>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync;

/// Adapts an async closure returning `anyhow::Result<()>` into an [`Action`].
struct FnAction {
    name: String,
    f: Box<ActionFn>,
}

impl Action for FnAction {
    fn run(&self, ctx: Arc<BuildContext>) -> BoxFuture<'static, TaskResult> {
        let name = self.name.clone();
        let fut = (self.f)(ctx);
        Box::pin(async move { fut.await.map_err(|e| TaskError::failed(name, e)) })
    }
}

#[derive(Clone)]
pub enum Task {
    Leaf {
        name: String,
        action: Arc<dyn Action>,
    },
    Series {
        name: String,
        children: Vec<Task>,
    },
    Parallel {
        name: String,
        children: Vec<Task>,
    },
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Task::Leaf { name, .. } => f.debug_tuple("Leaf").field(name).finish(),
            Task::Series { name, children } => f
                .debug_struct("Series")
                .field("name", name)
                .field("children", children)
                .finish(),
            Task::Parallel { name, children } => f
                .debug_struct("Parallel")
                .field("name", name)
                .field("children", children)
                .finish(),
        }
    }
}

impl Task {
    pub fn leaf(name: impl Into<String>, action: Arc<dyn Action>) -> Self {
        Task::Leaf {
            name: name.into(),
            action,
        }
    }

    /// Leaf task from an async closure.
    pub fn from_fn<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Arc<BuildContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name = name.into();
        let action = FnAction {
            name: name.clone(),
            f: Box::new(move |ctx| -> BoxFuture<'static, anyhow::Result<()>> {
                Box::pin(f(ctx))
            }),
        };
        Task::leaf(name, Arc::new(action))
    }

    pub fn stream(stream: StreamTask) -> Self {
        let name = stream.name().to_string();
        Task::leaf(name, Arc::new(stream))
    }

    pub fn name(&self) -> &str {
        match self {
            Task::Leaf { name, .. } | Task::Series { name, .. } | Task::Parallel { name, .. } => {
                name
            }
        }
    }

    /// Run the task to completion. The returned future is `'static` so
    /// composites can spawn it.
    pub fn run(&self, ctx: Arc<BuildContext>) -> BoxFuture<'static, TaskResult> {
        let task = self.clone();
        Box::pin(async move {
            match task {
                Task::Leaf { name, action } => run_leaf(name, action, ctx).await,
                Task::Series { name, children } => compose::run_series(name, children, ctx).await,
                Task::Parallel { name, children } => {
                    compose::run_parallel(name, children, ctx).await
                }
            }
        })
    }

    /// Indented tree of task names, one per line.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.describe_into(0, &mut lines);
        lines
    }

    fn describe_into(&self, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        match self {
            Task::Leaf { name, .. } => lines.push(format!("{indent}{name}")),
            Task::Series { name, children } | Task::Parallel { name, children } => {
                let kind = if matches!(self, Task::Series { .. }) {
                    "series"
                } else {
                    "parallel"
                };
                lines.push(format!("{indent}{name} ({kind})"));
                for child in children {
                    child.describe_into(depth + 1, lines);
                }
            }
        }
    }
}

async fn run_leaf(name: String, action: Arc<dyn Action>, ctx: Arc<BuildContext>) -> TaskResult {
    info!(task = %name, "starting");
    let started = Instant::now();
    let result = action.run(ctx).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match &result {
        Ok(()) => info!(task = %name, elapsed_ms, "finished"),
        Err(err) => error!(task = %name, elapsed_ms, error = %err, "failed"),
    }
    result
}
