// src/task/compose.rs

//! `series` and `parallel` composition.
//!
//! `series` runs children one after another and stops at the first failure.
//! `parallel` spawns every child on the tokio runtime, never cancels a
//! sibling, and only completes once all children have.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::context::BuildContext;
use crate::task::{Task, TaskError, TaskResult};

pub fn series(name: impl Into<String>, children: Vec<Task>) -> Task {
    Task::Series {
        name: name.into(),
        children,
    }
}

pub fn parallel(name: impl Into<String>, children: Vec<Task>) -> Task {
    Task::Parallel {
        name: name.into(),
        children,
    }
}

pub(crate) async fn run_series(
    name: String,
    children: Vec<Task>,
    ctx: Arc<BuildContext>,
) -> TaskResult {
    debug!(task = %name, children = children.len(), "starting series");
    let started = Instant::now();

    for child in &children {
        if let Err(cause) = child.run(Arc::clone(&ctx)).await {
            return Err(TaskError::Series {
                series: name,
                child: child.name().to_string(),
                cause: Box::new(cause),
            });
        }
    }

    debug!(
        task = %name,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "series finished"
    );
    Ok(())
}

pub(crate) async fn run_parallel(
    name: String,
    children: Vec<Task>,
    ctx: Arc<BuildContext>,
) -> TaskResult {
    debug!(task = %name, children = children.len(), "starting parallel");
    let started = Instant::now();

    let handles: Vec<_> = children
        .iter()
        .map(|child| {
            let handle = tokio::spawn(child.run(Arc::clone(&ctx)));
            (child.name().to_string(), handle)
        })
        .collect();

    let mut failures = Vec::new();
    for (child, handle) in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => failures.push(err),
            Err(join_err) => {
                debug!(task = %child, error = %join_err, "child task did not complete");
                failures.push(TaskError::Panicked { task: child });
            }
        }
    }

    debug!(
        task = %name,
        elapsed_ms = started.elapsed().as_millis() as u64,
        failed = failures.len(),
        "parallel finished"
    );

    if failures.is_empty() {
        Ok(())
    } else {
        Err(TaskError::Parallel {
            name,
            total: children.len(),
            failures,
        })
    }
}
