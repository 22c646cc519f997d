// src/engine/mod.rs

//! Watch-mode orchestration engine.
//!
//! Each watch binding is a small state machine: `idle → running → idle`.
//! A trigger that arrives while its binding is running is remembered in a
//! single pending slot; further triggers are coalesced into it. When the run
//! completes, a pending trigger starts the next run immediately.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

/// Canonical binding name type used throughout the engine.
pub type BindingName = String;

/// Outcome of one run of a binding's task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failed,
}

/// Why a binding was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Triggered programmatically (tests, startup).
    Manual,
    /// Triggered due to a filesystem event.
    FileWatch,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit the runtime once every binding is idle with nothing pending.
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher and the executor.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A binding's task should run.
    BindingTriggered {
        binding: BindingName,
        reason: TriggerReason,
    },
    /// A run of a binding's task finished.
    BindingCompleted {
        binding: BindingName,
        run: u64,
        outcome: RunOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// A run the core wants the executor to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledRun {
    pub binding: BindingName,
    /// Monotonic run id, unique across bindings.
    pub run: u64,
    pub reason: TriggerReason,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;
pub mod state;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
pub use state::{BindingState, BindingStates};
