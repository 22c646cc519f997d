#![allow(dead_code)]

use std::sync::Arc;

use sitepipe::context::BuildContext;
use sitepipe::fs::mock::MockFileSystem;

pub use sitepipe_test_utils::builders::{ConfigFileBuilder, PACKAGE_JSON, ProjectBuilder};
pub use sitepipe_test_utils::{init_tracing, with_timeout};

/// Contents of `path` (relative to the project root) in the mock filesystem.
pub fn read(fs: &MockFileSystem, path: &str) -> Option<String> {
    fs.contents(format!("./{path}"))
}

/// Project with the default layout and the given files.
pub fn project(files: &[(&str, &str)]) -> (MockFileSystem, Arc<BuildContext>) {
    files
        .iter()
        .fold(ProjectBuilder::new(), |p, (path, contents)| p.file(path, contents))
        .build()
}
