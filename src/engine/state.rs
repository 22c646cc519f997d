// src/engine/state.rs

use std::collections::BTreeMap;

use tracing::warn;

use super::{BindingName, ScheduledRun, TriggerReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Idle,
    Running { run: u64 },
}

/// Run state of every known binding plus the run id counter.
#[derive(Debug)]
pub struct BindingStates {
    states: BTreeMap<BindingName, BindingState>,
    next_run: u64,
}

impl BindingStates {
    pub fn new<I, S>(bindings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<BindingName>,
    {
        let states = bindings
            .into_iter()
            .map(|b| (b.into(), BindingState::Idle))
            .collect();
        Self { states, next_run: 1 }
    }

    pub fn state_of(&self, binding: &str) -> Option<BindingState> {
        self.states.get(binding).copied()
    }

    pub fn all_idle(&self) -> bool {
        self.states.values().all(|s| *s == BindingState::Idle)
    }

    /// Mark `binding` running and allocate a run id.
    pub fn start(&mut self, binding: &str, reason: TriggerReason) -> ScheduledRun {
        let run = self.next_run;
        self.next_run += 1;
        self.states
            .insert(binding.to_string(), BindingState::Running { run });
        ScheduledRun {
            binding: binding.to_string(),
            run,
            reason,
        }
    }

    /// Mark `binding` idle if `run` is its current run. Returns false for
    /// completions that do not match (stale or unknown).
    pub fn finish(&mut self, binding: &str, run: u64) -> bool {
        match self.states.get_mut(binding) {
            Some(state) if *state == (BindingState::Running { run }) => {
                *state = BindingState::Idle;
                true
            }
            other => {
                warn!(binding = %binding, run, state = ?other, "ignoring unexpected completion");
                false
            }
        }
    }
}
