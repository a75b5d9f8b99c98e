use clap::Subcommand;
use memsync_core::TriggerMode;
use memsync_store::{load_config, save_config, StatePaths};
use std::path::Path;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key (trigger-mode)
        key: String,
        /// Config value (default | gitmode)
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key (trigger-mode)
        key: String,
    },
    /// List all config values
    List,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd, repo_root: &Path) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Set { key, value } => set(repo_root, &key, &value),
        ConfigCmd::Get { key } => get(repo_root, &key),
        ConfigCmd::List => list(repo_root),
    }
}

// ── Command Implementations ──

/// Accepts `trigger-mode`, `trigger_mode` and the on-disk `triggerMode`.
fn is_trigger_mode_key(key: &str) -> bool {
    matches!(key, "trigger-mode" | "trigger_mode" | "triggerMode")
}

/// `memsync config set <key> <value>`
pub fn set(repo_root: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    if !is_trigger_mode_key(key) {
        anyhow::bail!("unknown config key: {key} (supported: trigger-mode)");
    }
    let mode: TriggerMode = value.parse().map_err(anyhow::Error::msg)?;
    let paths = StatePaths::discover(repo_root);
    let mut config = load_config(&paths);
    config.trigger_mode = mode;
    save_config(&paths, &config)?;
    println!("trigger-mode = {mode}");
    Ok(())
}

/// `memsync config get <key>`
pub fn get(repo_root: &Path, key: &str) -> anyhow::Result<()> {
    if !is_trigger_mode_key(key) {
        anyhow::bail!("unknown config key: {key} (supported: trigger-mode)");
    }
    let config = load_config(&StatePaths::discover(repo_root));
    println!("{}", config.trigger_mode);
    Ok(())
}

/// `memsync config list`
pub fn list(repo_root: &Path) -> anyhow::Result<()> {
    let config = load_config(&StatePaths::discover(repo_root));
    println!("trigger-mode = {}", config.trigger_mode);
    for (k, v) in &config.extra {
        println!("{k} = {v}");
    }
    Ok(())
}
