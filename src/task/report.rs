// src/task/report.rs

use tracing::error;

use crate::task::{TaskError, TaskResult};
use crate::transform::TransformError;

/// Collects transform failures for one stream task run.
///
/// Each failure is logged as soon as it is reported; processing of other
/// files continues. [`ErrorReporter::finish`] turns a non-empty report into a
/// task failure.
#[derive(Debug)]
pub struct ErrorReporter {
    task: String,
    failures: Vec<TransformError>,
}

impl ErrorReporter {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            failures: Vec::new(),
        }
    }

    pub fn report(&mut self, err: TransformError) {
        let file = err
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match &err.code_frame {
            Some(frame) => error!(
                task = %self.task,
                plugin = %err.plugin,
                file = %file,
                "{}\n{frame}",
                err.message
            ),
            None => error!(
                task = %self.task,
                plugin = %err.plugin,
                file = %file,
                "{}",
                err.message
            ),
        }
        self.failures.push(err);
    }

    pub fn failures(&self) -> &[TransformError] {
        &self.failures
    }

    pub fn finish(self) -> TaskResult {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(TaskError::TransformFailures {
                task: self.task,
                failures: self.failures.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn empty_report_is_success() {
        assert!(ErrorReporter::new("styles").finish().is_ok());
    }

    #[test]
    fn failures_are_counted() {
        let mut reporter = ErrorReporter::new("styles");
        reporter.report(
            TransformError::new("css-minify", "unterminated comment")
                .with_code_frame("1 | /*\n  | ^".to_string())
                .with_file(Path::new("./src/assets/css/a.css")),
        );
        reporter.report(TransformError::new("banner", "bad"));
        assert_eq!(reporter.failures().len(), 2);

        match reporter.finish() {
            Err(TaskError::TransformFailures { task, failures }) => {
                assert_eq!(task, "styles");
                assert_eq!(failures, 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
