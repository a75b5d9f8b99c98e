//! PostToolUse: turn one tool call into dirty-set entries and a session event.

use std::path::Path;

use memsync_core::{DirtyEntry, SessionEvent, TriggerMode};
use memsync_store::{load_config, DirtySetStore, SessionEventLog, StatePaths};
use serde_json::Value;

use crate::classify::ToolInvocation;
use crate::git;
use crate::paths;
use crate::shell;

/// What one recorder run persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct RecordOutcome {
    /// Paths that passed the filter, in extraction order.
    pub tracked: Vec<String>,
    pub event_appended: bool,
}

/// Record a PostToolUse payload against the project at `project_root`.
pub(crate) fn record_tool_use(project_root: &Path, raw: &Value) -> anyhow::Result<RecordOutcome> {
    let state = StatePaths::discover(project_root);
    let invocation = ToolInvocation::from_payload(raw);
    let is_commit = invocation.is_commit();

    let entries: Vec<DirtyEntry> = if is_commit {
        let probe = git::probe_head_commit(project_root);
        tracing::debug!(
            commit = ?probe.context,
            files = probe.paths.len(),
            "commit detected"
        );
        filter_candidates(project_root, probe.paths.iter().map(String::as_str))
            .into_iter()
            .map(|p| match &probe.context {
                Some(ctx) => DirtyEntry::with_commit(p, ctx.clone()),
                None => DirtyEntry::new(p),
            })
            .collect()
    } else {
        if load_config(&state).trigger_mode == TriggerMode::Gitmode {
            return Ok(RecordOutcome::default());
        }
        let candidates = match &invocation {
            ToolInvocation::Edit { path, .. } | ToolInvocation::DirectFile { path } => {
                vec![path.clone()]
            }
            ToolInvocation::Shell { command } => shell::extract_targets(command).into_paths(),
            ToolInvocation::Unrecognized => return Ok(RecordOutcome::default()),
        };
        filter_candidates(project_root, candidates.iter().map(String::as_str))
            .into_iter()
            .map(DirtyEntry::new)
            .collect()
    };

    if entries.is_empty() && !is_commit {
        return Ok(RecordOutcome::default());
    }

    let tracked: Vec<String> = entries.iter().map(|e| e.path.clone()).collect();
    if !entries.is_empty() {
        DirtySetStore::new(&state).merge(entries)?;
    }

    let mut event = SessionEvent::new(invocation.tool_name());
    match &invocation {
        ToolInvocation::Edit { .. } | ToolInvocation::DirectFile { .. } => {
            if let Some(first) = tracked.first() {
                event = event.with_file_path(first.clone());
            }
        }
        ToolInvocation::Shell { command } => {
            event = event.with_command(command.trim());
        }
        ToolInvocation::Unrecognized => {}
    }
    SessionEventLog::new(&state).append(&event)?;

    tracing::debug!(tool = invocation.tool_name(), tracked = tracked.len(), "tool use recorded");
    Ok(RecordOutcome {
        tracked,
        event_appended: true,
    })
}

/// Resolve, filter and dedupe candidate paths, keeping first-seen order.
fn filter_candidates<'a>(
    project_root: &Path,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for candidate in candidates {
        let resolved = paths::resolve(project_root, candidate);
        if !paths::should_track(project_root, &resolved) {
            continue;
        }
        let s = resolved.to_string_lossy().to_string();
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}
