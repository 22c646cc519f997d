// src/watch/event_handler.rs

//! Turns one changed path into binding triggers.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::fs::FileSystem;
use crate::sources::collect_matching_files;
use crate::watch::bindings::BindingProfile;
use crate::watch::hash::{HashStore, compute_hash_for_paths};
use crate::watch::path_utils::relative_str;

/// Send a trigger for every binding whose globs match `path`.
///
/// Bindings with `use_hash` only trigger when the aggregate hash of their
/// watched files changed. Returns false once the runtime has gone away.
pub async fn process_file_change(
    fs: Arc<dyn FileSystem>,
    root: &Path,
    path: &Path,
    profiles: &[BindingProfile],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
    hashes: Arc<Mutex<HashStore>>,
) -> bool {
    let Some(rel) = relative_str(root, path) else {
        debug!(?path, ?root, "event outside project root");
        return true;
    };

    for profile in profiles.iter().filter(|p| p.matches(&rel)) {
        if !should_trigger(Arc::clone(&fs), root, &rel, profile, Arc::clone(&hashes)).await {
            continue;
        }

        debug!(binding = %profile.name(), path = %rel, "watch match -> triggering binding");
        let event = RuntimeEvent::BindingTriggered {
            binding: profile.name().to_string(),
            reason: TriggerReason::FileWatch,
        };
        if let Err(err) = runtime_tx.send(event).await {
            warn!("failed to send RuntimeEvent::BindingTriggered: {err}");
            return false;
        }
    }

    true
}

/// Hash gate for `use_hash` bindings. Any error falls back to triggering.
async fn should_trigger(
    fs: Arc<dyn FileSystem>,
    root: &Path,
    rel_path: &str,
    profile: &BindingProfile,
    hashes: Arc<Mutex<HashStore>>,
) -> bool {
    if !profile.use_hash() {
        return true;
    }

    let root: PathBuf = root.to_path_buf();
    let profile = profile.clone();
    let rel_path = rel_path.to_string();

    tokio::task::spawn_blocking(move || {
        let binding = profile.name();
        let files = match collect_matching_files(fs.as_ref(), &root, &root, |rel| {
            profile.matches(rel)
        }) {
            Ok(files) => files,
            Err(err) => {
                warn!(binding, error = %err, "failed to collect watched files; triggering anyway");
                return true;
            }
        };

        let hash = match compute_hash_for_paths(fs.as_ref(), &files) {
            Ok(hash) => hash,
            Err(err) => {
                warn!(binding, error = %err, "failed to hash watched files; triggering anyway");
                return true;
            }
        };

        let Ok(mut store) = hashes.lock() else {
            warn!(binding, "hash store mutex poisoned; triggering anyway");
            return true;
        };

        if store.update(binding, hash) {
            true
        } else {
            info!(binding, path = %rel_path, "content unchanged; skipping trigger");
            false
        }
    })
    .await
    .unwrap_or(true)
}
