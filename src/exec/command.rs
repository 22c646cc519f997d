// src/exec/command.rs

//! Shell command runner used by external transform capabilities.

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Build a shell command appropriate for the platform.
pub fn shell(cmdline: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmdline);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmdline);
        c
    }
}

/// Run `cmdline` with `input` on stdin and return its stdout.
///
/// A non-zero exit is an error carrying the command's stderr.
pub async fn run_filter(label: &str, cmdline: &str, input: Vec<u8>) -> Result<Vec<u8>> {
    debug!(capability = label, cmd = %cmdline, bytes = input.len(), "running filter command");

    let mut cmd = shell(cmdline);
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning '{cmdline}' for {label}"))?;

    // stdin is written concurrently with draining stdout/stderr.
    let writer = child.stdin.take().map(|mut stdin| {
        tokio::spawn(async move {
            let res = stdin.write_all(&input).await;
            drop(stdin);
            res
        })
    });

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for '{cmdline}'"))?;

    if let Some(writer) = writer {
        match writer.await {
            Ok(Err(e)) => warn!(capability = label, error = %e, "filter closed stdin early"),
            Err(e) => warn!(capability = label, error = %e, "stdin writer task failed"),
            Ok(Ok(())) => {}
        }
    }

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("'{cmdline}' exited with code {code}: {}", stderr.trim());
    }

    debug!(capability = label, bytes = output.stdout.len(), "filter command finished");
    Ok(output.stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pipes_stdin_to_stdout() {
        let out = run_filter("test", "tr a-z A-Z", b"hello".to_vec()).await.unwrap();
        assert_eq!(out, b"HELLO");
    }

    #[tokio::test]
    async fn non_zero_exit_reports_stderr() {
        let err = run_filter("test", "echo broken >&2; exit 3", Vec::new())
            .await
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("code 3"), "{msg}");
        assert!(msg.contains("broken"), "{msg}");
    }
}
