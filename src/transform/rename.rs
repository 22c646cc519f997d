// src/transform/rename.rs

use std::ffi::OsString;
use std::path::PathBuf;

use crate::context::BuildContext;
use crate::transform::{Artifact, BoxFuture, Transform, TransformError};

/// Inserts a suffix before the file extension: `app.js` → `app.min.js`.
/// Files without an extension get the suffix appended.
#[derive(Debug, Clone)]
pub struct Suffix {
    suffix: String,
}

impl Suffix {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn rename(&self, path: &std::path::Path) -> PathBuf {
        let Some(stem) = path.file_stem() else {
            return path.to_path_buf();
        };
        let mut name = OsString::from(stem);
        name.push(&self.suffix);
        if let Some(ext) = path.extension() {
            name.push(".");
            name.push(ext);
        }
        path.with_file_name(name)
    }
}

impl Transform for Suffix {
    fn id(&self) -> &str {
        "rename"
    }

    fn apply<'a>(
        &'a self,
        mut artifact: Artifact,
        _ctx: &'a BuildContext,
    ) -> BoxFuture<'a, Result<Artifact, TransformError>> {
        Box::pin(async move {
            artifact.relative = self.rename(&artifact.relative);
            Ok(artifact)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn suffix_goes_before_extension() {
        let min = Suffix::new(".min");
        assert_eq!(
            min.rename(Path::new("assets/css/a.css")),
            PathBuf::from("assets/css/a.min.css")
        );
        assert_eq!(min.rename(Path::new("LICENSE")), PathBuf::from("LICENSE.min"));
        assert_eq!(
            min.rename(Path::new("js/vendor.bundle.js")),
            PathBuf::from("js/vendor.bundle.min.js")
        );
    }
}
