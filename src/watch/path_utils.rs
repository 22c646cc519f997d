// src/watch/path_utils.rs

//! Path handling for watcher events.

use std::path::Path;

use crate::sources;

/// Convert an event path into a string relative to `root`, with forward
/// slashes.
///
/// Falls back to canonicalizing both sides when the direct prefix does not
/// match (symlinked temp dirs on macOS report `/private/var/...`). Returns
/// `None` if the path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Some(rel) = sources::relative_str(path, root) {
        return Some(rel);
    }

    let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) else {
        return None;
    };
    sources::relative_str(&path_canon, &root_canon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        assert_eq!(
            relative_str(Path::new("/proj"), Path::new("/proj/src/a.css")).as_deref(),
            Some("src/a.css")
        );
        assert_eq!(relative_str(Path::new("/proj"), Path::new("/elsewhere/a.css")), None);
    }
}
