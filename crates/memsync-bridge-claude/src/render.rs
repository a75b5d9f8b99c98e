//! Text rendered back to the host: the turn-end reason and the
//! session-start recall block.

use std::collections::BTreeMap;
use std::path::Path;

use memsync_core::{DirtyEntry, SessionEvent};

/// Paths listed inline in the turn-end reason.
pub(crate) const REASON_PATH_LIMIT: usize = 5;

/// File names listed inline in the automatic summary.
const SUMMARY_NAME_LIMIT: usize = 5;

// ── Automatic summary ──

/// One-line summary of a session's tracked work.
///
/// `Modified 3 files: a.rs, b.rs, c.md. 4 tool calls (1 Bash, 3 Edit).`
pub(crate) fn auto_summary(events: &[SessionEvent], entries: &[DirtyEntry]) -> String {
    let mut parts = Vec::new();

    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let name = Path::new(&entry.path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| entry.path.clone());
        if !names.contains(&name) {
            names.push(name);
        }
    }
    if !names.is_empty() {
        if names.len() <= SUMMARY_NAME_LIMIT {
            parts.push(format!("Modified {} files: {}", names.len(), names.join(", ")));
        } else {
            parts.push(format!(
                "Modified {} files: {}, +{} more",
                names.len(),
                names[..SUMMARY_NAME_LIMIT].join(", "),
                names.len() - SUMMARY_NAME_LIMIT
            ));
        }
    }

    let mut tool_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for event in events {
        if !event.tool_name.is_empty() {
            *tool_counts.entry(event.tool_name.as_str()).or_default() += 1;
        }
    }
    if !tool_counts.is_empty() {
        let tools: Vec<String> = tool_counts
            .iter()
            .map(|(tool, n)| format!("{n} {tool}"))
            .collect();
        parts.push(format!(
            "{} tool calls ({})",
            events.len(),
            tools.join(", ")
        ));
    }

    if parts.is_empty() {
        return "Session with no tracked changes.".to_string();
    }
    format!("{}.", parts.join(". "))
}

// ── Turn-end reason ──

/// Instruction text for the host when the turn gate blocks.
pub(crate) fn stop_reason(project: &str, entries: &[DirtyEntry], events: &[SessionEvent]) -> String {
    let files = if entries.is_empty() {
        "none".to_string()
    } else {
        let shown: Vec<&str> = entries
            .iter()
            .take(REASON_PATH_LIMIT)
            .map(|e| e.path.as_str())
            .collect();
        let mut s = shown.join(", ");
        if entries.len() > REASON_PATH_LIMIT {
            s.push_str(&format!(" (+{} more)", entries.len() - REASON_PATH_LIMIT));
        }
        s
    };
    let events_json = serde_json::to_string(events).unwrap_or_else(|_| "[]".to_string());
    let summary = auto_summary(events, entries);

    format!(
        "Sync session learnings for {project} to memory before stopping.\n\
         Files changed: {files}\n\
         Session events: {count}\n\
         \n\
         Call the memory engine's capture_session tool with:\n  \
         project: \"{project}\"\n  \
         summary: \"<what was done and learned; start from: {summary}>\"\n  \
         events: {events_json}\n\
         \n\
         Record durable conventions and decisions as memory entries, then reply only: \
         'Synced N learnings.'",
        count = events.len(),
    )
}

// ── Session-start recall ──

/// Header + token estimate + parts. `None` when there is nothing to show.
pub(crate) fn recall_block(project: &str, parts: &[String]) -> Option<String> {
    let parts: Vec<&str> = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }
    let combined = parts.join("\n\n");
    Some(format!(
        "=== memsync: {project} ===\n[{} estimated tokens]\n\n{combined}\n",
        estimate_tokens(&combined)
    ))
}

/// Rough token count: four bytes per token.
pub(crate) fn estimate_tokens(text: &str) -> usize {
    text.len() / 4
}
