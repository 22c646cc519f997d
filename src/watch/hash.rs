// src/watch/hash.rs

//! Content hashing for `[watch] use_hash = true`.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::fs::FileSystem;

/// Compute the hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Deterministic hash over the paths and contents of `paths`.
///
/// Order does not matter; paths are sorted first. Paths take part in the
/// hash so renames count as changes.
pub fn compute_hash_for_paths(fs: &dyn FileSystem, paths: &[PathBuf]) -> Result<String> {
    let mut sorted: Vec<&PathBuf> = paths.iter().collect();
    sorted.sort();

    let mut hasher = Hasher::new();
    for path in sorted {
        let file_hash = compute_file_hash(fs, path)?;
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update(b"\0");
        hasher.update(file_hash.as_bytes());
    }

    let hash = hasher.finalize().to_hex().to_string();
    debug!(hash = %hash, files = paths.len(), "computed aggregate hash");
    Ok(hash)
}

/// Last seen aggregate hash per binding, kept in memory for the lifetime of
/// the watcher.
#[derive(Debug, Default)]
pub struct HashStore {
    map: HashMap<String, String>,
}

impl HashStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, binding: &str) -> Option<&str> {
        self.map.get(binding).map(String::as_str)
    }

    /// Store `hash` for `binding`; returns true if it differs from the
    /// previous value (or there was none).
    pub fn update(&mut self, binding: &str, hash: String) -> bool {
        match self.map.insert(binding.to_string(), hash) {
            Some(old) => self.map.get(binding).is_some_and(|new| *new != old),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn aggregate_hash_tracks_content_not_order() {
        let fs = MockFileSystem::new();
        fs.add_file("./src/a.css", "a");
        fs.add_file("./src/b.css", "b");
        let a = PathBuf::from("./src/a.css");
        let b = PathBuf::from("./src/b.css");

        let h1 = compute_hash_for_paths(&fs, &[a.clone(), b.clone()]).unwrap();
        let h2 = compute_hash_for_paths(&fs, &[b.clone(), a.clone()]).unwrap();
        assert_eq!(h1, h2);

        fs.add_file("./src/b.css", "changed");
        let h3 = compute_hash_for_paths(&fs, &[a, b]).unwrap();
        assert_ne!(h1, h3);
    }

    #[test]
    fn store_reports_changes() {
        let mut store = HashStore::new();
        assert!(store.update("styles", "x".into()));
        assert!(!store.update("styles", "x".into()));
        assert!(store.update("styles", "y".into()));
        assert_eq!(store.load("styles"), Some("y"));
    }
}
