// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`RuntimeEvent`]s and produces an updated state plus a
//! list of commands for the IO shell (`engine::runtime::Runtime`), which is
//! responsible for reading channels, dispatching runs to the executor and
//! handling shutdown.
//!
//! The core has no channels, no Tokio types, and performs no IO, so it is
//! unit tested directly.

use crate::engine::event_handlers::{CoreStep, handle_binding_completion, handle_binding_trigger};
use crate::engine::queue::TriggerQueue;
use crate::engine::state::{BindingState, BindingStates};
use crate::engine::{BindingName, RuntimeEvent, RuntimeOptions};

#[derive(Debug)]
pub struct CoreRuntime {
    states: BindingStates,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new<I, S>(bindings: I, options: RuntimeOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<BindingName>,
    {
        Self {
            states: BindingStates::new(bindings),
            queue: TriggerQueue::new(),
            options,
        }
    }

    /// True when no binding is running.
    pub fn is_idle(&self) -> bool {
        self.states.all_idle()
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn state_of(&self, binding: &str) -> Option<BindingState> {
        self.states.state_of(binding)
    }

    pub fn has_pending(&self, binding: &str) -> bool {
        self.queue.is_pending(binding)
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::BindingTriggered { binding, reason } => {
                handle_binding_trigger(&mut self.states, &mut self.queue, binding, reason)
            }
            RuntimeEvent::BindingCompleted {
                binding,
                run,
                outcome,
            } => handle_binding_completion(
                &mut self.states,
                &mut self.queue,
                &self.options,
                binding,
                run,
                outcome,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CoreCommand, RunOutcome, ScheduledRun, TriggerReason};

    fn trigger(binding: &str) -> RuntimeEvent {
        RuntimeEvent::BindingTriggered {
            binding: binding.to_string(),
            reason: TriggerReason::FileWatch,
        }
    }

    fn completed(binding: &str, run: u64, outcome: RunOutcome) -> RuntimeEvent {
        RuntimeEvent::BindingCompleted {
            binding: binding.to_string(),
            run,
            outcome,
        }
    }

    fn dispatched(step: &CoreStep) -> Vec<(String, u64)> {
        step.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::Dispatch(ScheduledRun { binding, run, .. }) => {
                    Some((binding.clone(), *run))
                }
                CoreCommand::RequestExit => None,
            })
            .collect()
    }

    #[test]
    fn triggers_while_running_coalesce_into_one_rerun() {
        let mut core = CoreRuntime::new(["styles"], RuntimeOptions::default());

        let step = core.step(trigger("styles"));
        assert_eq!(dispatched(&step), vec![("styles".to_string(), 1)]);

        assert!(dispatched(&core.step(trigger("styles"))).is_empty());
        assert!(dispatched(&core.step(trigger("styles"))).is_empty());
        assert!(core.has_pending("styles"));

        let step = core.step(completed("styles", 1, RunOutcome::Success));
        assert_eq!(dispatched(&step), vec![("styles".to_string(), 2)]);
        assert!(!core.has_pending("styles"));

        let step = core.step(completed("styles", 2, RunOutcome::Success));
        assert!(dispatched(&step).is_empty());
        assert!(core.is_idle());
    }

    #[test]
    fn bindings_run_independently() {
        let mut core = CoreRuntime::new(["html", "styles"], RuntimeOptions::default());
        let a = core.step(trigger("html"));
        let b = core.step(trigger("styles"));
        assert_eq!(dispatched(&a), vec![("html".to_string(), 1)]);
        assert_eq!(dispatched(&b), vec![("styles".to_string(), 2)]);
    }

    #[test]
    fn failed_run_returns_binding_to_idle() {
        let mut core = CoreRuntime::new(["scripts"], RuntimeOptions::default());
        core.step(trigger("scripts"));
        let step = core.step(completed("scripts", 1, RunOutcome::Failed));
        assert!(step.keep_running);
        assert_eq!(core.state_of("scripts"), Some(BindingState::Idle));

        let step = core.step(trigger("scripts"));
        assert_eq!(dispatched(&step), vec![("scripts".to_string(), 2)]);
    }

    #[test]
    fn unknown_bindings_and_stale_completions_are_ignored() {
        let mut core = CoreRuntime::new(["html"], RuntimeOptions::default());
        assert!(dispatched(&core.step(trigger("nope"))).is_empty());

        core.step(trigger("html"));
        core.step(completed("html", 99, RunOutcome::Success));
        assert_eq!(core.state_of("html"), Some(BindingState::Running { run: 1 }));
    }

    #[test]
    fn exit_when_idle_waits_for_pending_reruns() {
        let mut core = CoreRuntime::new(
            ["html"],
            RuntimeOptions {
                exit_when_idle: true,
            },
        );
        core.step(trigger("html"));
        core.step(trigger("html"));

        let step = core.step(completed("html", 1, RunOutcome::Success));
        assert!(step.keep_running);

        let step = core.step(completed("html", 2, RunOutcome::Success));
        assert!(!step.keep_running);
        assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut core = CoreRuntime::new(["html"], RuntimeOptions::default());
        assert!(!core.step(RuntimeEvent::ShutdownRequested).keep_running);
    }
}
