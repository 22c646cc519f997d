use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sitepipe::engine::{RunOutcome, RuntimeEvent, ScheduledRun};
use sitepipe::errors::Result;
use sitepipe::exec::ExecutorBackend;
use tokio::sync::mpsc;

/// A fake executor that:
/// - records which bindings were run
/// - reports `BindingCompleted(Success)` after `run_duration`.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<String>>>,
    run_duration: Duration,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            run_duration: Duration::ZERO,
        }
    }

    /// Keep each run "busy" for `duration` before completing it.
    pub fn with_run_duration(mut self, duration: Duration) -> Self {
        self.run_duration = duration;
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_run(
        &mut self,
        run: ScheduledRun,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let duration = self.run_duration;

        Box::pin(async move {
            executed.lock().unwrap().push(run.binding.clone());
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                let _ = tx
                    .send(RuntimeEvent::BindingCompleted {
                        binding: run.binding,
                        run: run.run,
                        outcome: RunOutcome::Success,
                    })
                    .await;
            });
            Ok(())
        })
    }
}
