// src/engine/queue.rs

use std::collections::BTreeSet;

use tracing::debug;

use super::BindingName;

/// Pending re-runs: at most one per binding.
///
/// Recording a trigger for a binding that already has one pending is a no-op,
/// which is what coalesces bursts of file events into a single extra run.
#[derive(Debug, Default)]
pub struct TriggerQueue {
    pending: BTreeSet<BindingName>,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no binding has a pending re-run.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, binding: &str) -> bool {
        self.pending.contains(binding)
    }

    /// Remember that `binding` must run again. Returns false if a re-run was
    /// already pending.
    pub fn record_trigger(&mut self, binding: &str) -> bool {
        let inserted = self.pending.insert(binding.to_string());
        debug!(binding = %binding, inserted, "recorded trigger while running");
        inserted
    }

    /// Consume the pending re-run for `binding`, if any.
    pub fn take(&mut self, binding: &str) -> bool {
        self.pending.remove(binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesces_per_binding() {
        let mut q = TriggerQueue::new();
        assert!(q.record_trigger("styles"));
        assert!(!q.record_trigger("styles"));
        assert!(q.record_trigger("html"));

        assert!(q.take("styles"));
        assert!(!q.take("styles"));
        assert!(q.is_pending("html"));
        assert!(!q.is_empty());
    }
}
