// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of running tasks itself,
//! so tests can swap in a fake executor.
//!
//! - `RealExecutorBackend` runs the binding's [`Task`] on the tokio runtime
//!   and reports a `BindingCompleted` event when it finishes.
//! - Tests can provide their own backend that records runs and completes them
//!   on demand.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::context::BuildContext;
use crate::engine::{BindingName, RunOutcome, RuntimeEvent, ScheduledRun};
use crate::errors::Result;
use crate::task::Task;

/// Trait abstracting how scheduled runs are executed.
pub trait ExecutorBackend: Send {
    /// Start `run`. The implementation must eventually deliver a matching
    /// `RuntimeEvent::BindingCompleted`.
    fn spawn_run(&mut self, run: ScheduledRun)
    -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real executor backend used in production.
pub struct RealExecutorBackend {
    tasks: HashMap<BindingName, Task>,
    ctx: Arc<BuildContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealExecutorBackend {
    pub fn new(
        tasks: impl IntoIterator<Item = (BindingName, Task)>,
        ctx: Arc<BuildContext>,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
            ctx,
            runtime_tx,
        }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn spawn_run(
        &mut self,
        run: ScheduledRun,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let task = self.tasks.get(&run.binding).cloned();
        let ctx = Arc::clone(&self.ctx);
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let outcome = match task {
                    // Inner spawn so a panic still yields a completion.
                    Some(task) => match tokio::spawn(task.run(ctx)).await {
                        Ok(Ok(())) => RunOutcome::Success,
                        Ok(Err(err)) => {
                            error!(
                                binding = %run.binding,
                                run = run.run,
                                error = %err,
                                "run failed"
                            );
                            RunOutcome::Failed
                        }
                        Err(join_err) => {
                            error!(
                                binding = %run.binding,
                                run = run.run,
                                error = %join_err,
                                "run panicked"
                            );
                            RunOutcome::Failed
                        }
                    },
                    None => {
                        warn!(binding = %run.binding, "no task registered for binding");
                        RunOutcome::Failed
                    }
                };

                let completed = RuntimeEvent::BindingCompleted {
                    binding: run.binding,
                    run: run.run,
                    outcome,
                };
                if let Err(err) = tx.send(completed).await {
                    warn!(error = %err, "runtime gone; dropping completion");
                }
            });
            Ok(())
        })
    }
}
