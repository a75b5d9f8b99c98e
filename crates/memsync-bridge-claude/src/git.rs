use std::path::Path;
use std::time::Duration;

use memsync_core::CommitContext;

use crate::paths;
use crate::process::run_with_timeout;

const GIT_TIMEOUT: Duration = Duration::from_secs(5);

/// What a commit-triggering command left behind in the repository.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct CommitProbe {
    pub context: Option<CommitContext>,
    /// Absolute paths changed by HEAD, restricted to the project directory.
    pub paths: Vec<String>,
}

/// Read HEAD's short hash, subject and changed files.
///
/// Git missing, not a repository, or a timeout → empty probe. A failing
/// `diff-tree` keeps the commit context with no paths.
pub(crate) fn probe_head_commit(project_root: &Path) -> CommitProbe {
    let Some(log) = run_git(project_root, &["log", "-1", "--format=%h %s"]) else {
        return CommitProbe::default();
    };
    let Some(context) = parse_log_line(&log) else {
        return CommitProbe::default();
    };

    // --root: the first commit has no parent to diff against.
    // --relative: names relative to (and limited to) the project directory.
    let paths = run_git(
        project_root,
        &[
            "diff-tree",
            "--root",
            "--relative",
            "--no-commit-id",
            "--name-only",
            "-r",
            "-z",
            "HEAD",
        ],
    )
    .map(|out| parse_name_list(&out, project_root))
    .unwrap_or_default();

    CommitProbe {
        context: Some(context),
        paths,
    }
}

fn run_git(cwd: &Path, args: &[&str]) -> Option<String> {
    run_with_timeout(Path::new("git"), args, cwd, GIT_TIMEOUT)
}

/// Parse `git log -1 --format=%h %s` output.
fn parse_log_line(out: &str) -> Option<CommitContext> {
    let line = out.lines().next()?.trim();
    if line.is_empty() {
        return None;
    }
    let (hash, message) = line.split_once(' ').unwrap_or((line, ""));
    Some(CommitContext::new(hash, message.trim()))
}

/// Parse NUL-separated `diff-tree -z --name-only` output into absolute paths.
fn parse_name_list(out: &str, project_root: &Path) -> Vec<String> {
    out.split(['\0', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|rel| {
            paths::resolve(project_root, rel)
                .to_string_lossy()
                .to_string()
        })
        .collect()
}
