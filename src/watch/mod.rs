// src/watch/mod.rs

//! File watching and change detection.
//!
//! - Compiles each watch binding's globs (plus the global excludes).
//! - Wires up a cross-platform filesystem watcher (`notify`).
//! - Optionally gates triggers on content hashes (`[watch] use_hash`).
//!
//! It only turns filesystem changes into binding triggers; debouncing lives
//! in the engine.

pub mod bindings;
pub mod event_handler;
pub mod hash;
pub mod path_utils;
pub mod watcher;

pub use bindings::{BindingProfile, build_binding_profiles};
pub use hash::{HashStore, compute_hash_for_paths};
pub use watcher::{WatcherHandle, spawn_watcher};
