use std::path::Path;

use memsync_store::{DirtySetStore, StatePaths, StopLatch};
use serde_json::Value;

use crate::engine::{EngineEnv, MemoryEngine};
use crate::gate;
use crate::parse::*;
use crate::recorder;
use crate::render;

// ── Hook Result ──

/// Result from a hook dispatch: text for stdout, consumed by Claude Code.
///
/// Failures are logged and degrade to an empty result.
#[derive(Debug, Default, Clone)]
pub struct HookResult {
    pub stdout: Option<String>,
}

impl HookResult {
    pub fn output(stdout: String) -> Self {
        Self {
            stdout: Some(stdout),
        }
    }

    /// No output, exit 0.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<Option<String>> for HookResult {
    fn from(stdout: Option<String>) -> Self {
        Self { stdout }
    }
}

// ── Hook dispatch ──

/// Main hook entrypoint: parse stdin, dispatch by `hook_event_name`.
///
/// Malformed input is treated as `{}`. Internal failures are logged and
/// surface as an empty result, never as an error the host would see.
pub fn hook_entrypoint_from_stdin(stdin: &str) -> anyhow::Result<HookResult> {
    let raw = parse_hook_stdin(stdin);
    let project_root = resolve_project_root(&get_str(&raw, "cwd"));
    dispatch_event(&raw, &project_root, &EngineEnv::from_env())
}

fn dispatch_event(
    raw: &Value,
    project_root: &Path,
    engine_env: &EngineEnv,
) -> anyhow::Result<HookResult> {
    let hook_event_name = get_str(raw, "hook_event_name");
    let session_id = get_str(raw, "session_id");
    tracing::debug!(
        event = %hook_event_name,
        session_id = %session_id,
        project = %project_root.display(),
        "hook dispatch"
    );

    // Dispatch:
    //   SessionStart → re-arm the session's gate, print engine recall
    //   PostToolUse  → record tracked files + session event (no output)
    //   Stop         → once-per-session block decision
    //   PreCompact   → side-effect free, NO output (the host's schema does
    //                  not accept context for PreCompact)
    //   SessionEnd   → tear down the session's gate
    let result = match hook_event_name.as_str() {
        "SessionStart" => dispatch_session_start(project_root, &session_id, engine_env),
        "PostToolUse" => {
            if let Err(e) = recorder::record_tool_use(project_root, raw) {
                tracing::warn!(error = %e, "failed to record tool use");
            }
            HookResult::empty()
        }
        "Stop" => match gate::evaluate_stop(project_root, &session_id) {
            Ok(Some(decision)) => HookResult::output(serde_json::to_string(&decision)?),
            Ok(None) => HookResult::empty(),
            Err(e) => {
                tracing::warn!(error = %e, "stop gate evaluation failed");
                HookResult::empty()
            }
        },
        "PreCompact" => {
            let state = StatePaths::discover(project_root);
            tracing::info!(
                tracked = DirtySetStore::new(&state).len(),
                "pre-compact: tracked files pending sync"
            );
            HookResult::empty()
        }
        "SessionEnd" => dispatch_session_end(project_root, &session_id),
        _ => HookResult::empty(),
    };
    Ok(result)
}

fn dispatch_session_start(
    project_root: &Path,
    session_id: &str,
    engine_env: &EngineEnv,
) -> HookResult {
    let state = StatePaths::discover(project_root);
    if let Err(e) = StopLatch::new(&state, session_id).reset() {
        tracing::warn!(error = %e, "failed to reset stop latch");
    }

    let Some(engine) = MemoryEngine::locate(engine_env) else {
        return HookResult::empty();
    };
    let project = state.project_name();
    let parts = engine.recall(&project, project_root);
    HookResult::from(render::recall_block(&project, &parts))
}

fn dispatch_session_end(project_root: &Path, session_id: &str) -> HookResult {
    let state = StatePaths::discover(project_root);
    if let Err(e) = StopLatch::new(&state, session_id).reset() {
        tracing::warn!(error = %e, "failed to reset stop latch");
    }
    let unsynced = DirtySetStore::new(&state).len();
    if unsynced > 0 {
        tracing::info!(unsynced, "session ended with unsynced files");
    }
    HookResult::empty()
}
