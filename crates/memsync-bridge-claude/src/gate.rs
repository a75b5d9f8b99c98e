//! Stop: block the turn once per session so the host syncs its learnings.

use std::path::Path;

use memsync_store::{DirtySetStore, SessionEventLog, StatePaths, StopLatch, EVENT_CAP};
use serde::Serialize;

use crate::render;

/// Stop-hook decision payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDecision {
    pub decision: &'static str,
    pub reason: String,
    pub suppress_output: bool,
}

impl StopDecision {
    pub fn block(reason: String) -> Self {
        Self {
            decision: "block",
            reason,
            suppress_output: true,
        }
    }
}

/// Evaluate the turn gate for `session_id`.
///
/// Only the first call per session reads the buffers; later calls are
/// no-ops. Both buffers are drained whenever the gate fires.
pub(crate) fn evaluate_stop(
    project_root: &Path,
    session_id: &str,
) -> anyhow::Result<Option<StopDecision>> {
    let state = StatePaths::discover(project_root);
    if !StopLatch::new(&state, session_id).try_fire() {
        tracing::debug!(session_id, "stop gate already fired");
        return Ok(None);
    }

    let entries = DirtySetStore::new(&state).read_and_clear()?;
    let events = SessionEventLog::new(&state).read_and_clear(EVENT_CAP)?;
    if entries.is_empty() {
        tracing::debug!(events = events.len(), "stop gate fired with nothing to sync");
        return Ok(None);
    }

    let project = state.project_name();
    tracing::info!(
        project = %project,
        files = entries.len(),
        events = events.len(),
        "blocking turn for memory sync"
    );
    Ok(Some(StopDecision::block(render::stop_reason(
        &project, &entries, &events,
    ))))
}
