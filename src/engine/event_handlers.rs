// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, info, warn};

use crate::engine::queue::TriggerQueue;
use crate::engine::state::{BindingState, BindingStates};
use crate::engine::{BindingName, RunOutcome, RuntimeOptions, ScheduledRun, TriggerReason};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start this run on the executor.
    Dispatch(ScheduledRun),
    /// Request that the process exits (used with `exit_when_idle`).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn keep(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a binding trigger.
///
/// - Idle binding: start a run right away.
/// - Running binding: record one pending re-run; more triggers coalesce.
pub fn handle_binding_trigger(
    states: &mut BindingStates,
    queue: &mut TriggerQueue,
    binding: BindingName,
    reason: TriggerReason,
) -> CoreStep {
    match states.state_of(&binding) {
        None => {
            warn!(binding = %binding, "trigger for unknown binding ignored");
            CoreStep::keep(Vec::new())
        }
        Some(BindingState::Idle) => {
            let run = states.start(&binding, reason);
            debug!(binding = %binding, run = run.run, ?reason, "binding idle; starting run");
            CoreStep::keep(vec![CoreCommand::Dispatch(run)])
        }
        Some(BindingState::Running { run }) => {
            if queue.record_trigger(&binding) {
                info!(binding = %binding, run, "change while running; re-run queued");
            } else {
                debug!(binding = %binding, run, "re-run already queued; coalesced");
            }
            CoreStep::keep(Vec::new())
        }
    }
}

/// Handle a completed run.
///
/// Failures are logged and the binding goes back to idle like a success. A
/// pending re-run is started immediately.
pub fn handle_binding_completion(
    states: &mut BindingStates,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    binding: BindingName,
    run: u64,
    outcome: RunOutcome,
) -> CoreStep {
    let mut commands = Vec::new();

    if states.finish(&binding, run) {
        match outcome {
            RunOutcome::Success => info!(binding = %binding, run, "run succeeded"),
            RunOutcome::Failed => warn!(binding = %binding, run, "run failed; still watching"),
        }

        if queue.take(&binding) {
            let next = states.start(&binding, TriggerReason::FileWatch);
            debug!(binding = %binding, run = next.run, "starting queued re-run");
            commands.push(CoreCommand::Dispatch(next));
        }
    }

    let mut keep_running = true;
    if options.exit_when_idle && states.all_idle() && queue.is_empty() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}
