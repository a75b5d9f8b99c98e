use memsync_store::{load_config, DirtySetStore, SessionEventLog, StatePaths, StopLatch};
use std::path::Path;

pub fn execute(repo_root: &Path, json: bool, session: Option<&str>) -> anyhow::Result<()> {
    let paths = StatePaths::discover(repo_root);
    let config = load_config(&paths);
    let entries = DirtySetStore::new(&paths).entries();
    let events = SessionEventLog::new(&paths).len();
    let latches: Vec<String> = paths
        .latch_files()
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect();
    let session_fired = session.map(|sid| StopLatch::new(&paths, sid).is_set());

    if json {
        let out = serde_json::json!({
            "project": paths.project_name(),
            "triggerMode": config.trigger_mode,
            "dirtyFiles": entries.iter().map(|e| e.to_line()).collect::<Vec<_>>(),
            "sessionEvents": events,
            "latches": latches,
            "sessionGateFired": session_fired,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Project: {}", paths.project_name());
    println!("Trigger mode: {}", config.trigger_mode);
    if entries.is_empty() {
        println!("Tracked files: (none)");
    } else {
        println!("Tracked files ({}):", entries.len());
        for e in &entries {
            println!("  {e}");
        }
    }
    println!("Buffered events: {events}");
    match (session, session_fired) {
        (Some(sid), Some(fired)) => {
            let state = if fired { "fired" } else { "armed" };
            println!("Gate for session {sid}: {state}");
        }
        _ => println!("Gates fired: {}", latches.len()),
    }
    Ok(())
}
