//! Bounded subprocess execution.
//!
//! Hooks run inline with the host's turn, so every child process gets a
//! hard deadline. Timeouts, spawn failures and non-zero exits all collapse
//! to `None`.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

/// Captured stdout is truncated to this many bytes; the rest is drained
/// and discarded so the child still runs to completion.
const MAX_STDOUT_BYTES: u64 = 1024 * 1024;

/// Run `program args…` in `cwd`, returning stdout if it exits 0 within
/// `timeout`.
pub(crate) fn run_with_timeout(
    program: &Path,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> Option<String> {
    let mut child = match Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(program = %program.display(), error = %e, "spawn failed");
            return None;
        }
    };

    // Drain stdout concurrently so a chatty child cannot block on a full pipe.
    let reader = child.stdout.take().map(|mut stdout| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stdout.by_ref().take(MAX_STDOUT_BYTES).read_to_end(&mut buf);
            let _ = std::io::copy(&mut stdout, &mut std::io::sink());
            buf
        })
    });

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => Some(status),
        Ok(None) => {
            tracing::debug!(
                program = %program.display(),
                timeout_secs = timeout.as_secs(),
                "subprocess timed out"
            );
            let _ = child.kill();
            let _ = child.wait();
            None
        }
        Err(e) => {
            tracing::debug!(program = %program.display(), error = %e, "wait failed");
            let _ = child.kill();
            let _ = child.wait();
            None
        }
    };

    // On timeout the reader is left detached: a grandchild may still hold
    // the pipe open, and the hook process exits shortly anyway.
    let status = status?;
    if !status.success() {
        tracing::debug!(program = %program.display(), %status, "subprocess failed");
        return None;
    }
    let stdout = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    Some(String::from_utf8_lossy(&stdout).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_on_success() {
        let out = run_with_timeout(
            Path::new("sh"),
            &["-c", "echo hello"],
            Path::new("."),
            Duration::from_secs(5),
        );
        assert_eq!(out.as_deref(), Some("hello\n"));
    }

    #[test]
    fn non_zero_exit_is_none() {
        let out = run_with_timeout(
            Path::new("sh"),
            &["-c", "echo partial; exit 3"],
            Path::new("."),
            Duration::from_secs(5),
        );
        assert_eq!(out, None);
    }

    #[test]
    fn missing_binary_is_none() {
        let out = run_with_timeout(
            Path::new("definitely-not-a-real-binary-xyz"),
            &[],
            Path::new("."),
            Duration::from_secs(1),
        );
        assert_eq!(out, None);
    }

    #[test]
    fn oversized_stdout_is_truncated_not_dropped() {
        let out = run_with_timeout(
            Path::new("sh"),
            &["-c", "yes abcdefgh | head -c 3000000"],
            Path::new("."),
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(out.len() as u64, MAX_STDOUT_BYTES);
        assert!(out.starts_with("abcdefgh\n"));
    }

    #[test]
    fn timeout_kills_child() {
        let start = std::time::Instant::now();
        let out = run_with_timeout(
            Path::new("sh"),
            &["-c", "exec sleep 10"],
            Path::new("."),
            Duration::from_millis(200),
        );
        assert_eq!(out, None);
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
