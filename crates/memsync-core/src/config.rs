use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which tool invocations the recorder tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Edits, file-mutating shell commands and commits.
    #[default]
    Default,
    /// Git commits only.
    Gitmode,
}

impl TriggerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::Default => "default",
            TriggerMode::Gitmode => "gitmode",
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "default" => Ok(TriggerMode::Default),
            "gitmode" => Ok(TriggerMode::Gitmode),
            other => Err(format!(
                "unknown trigger mode '{other}' (expected 'default' or 'gitmode')"
            )),
        }
    }
}

/// Contents of `.claude/memsync/config.json`.
///
/// Unknown keys are preserved so `memsync config set` never drops settings
/// written by other tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemsyncConfig {
    #[serde(default, deserialize_with = "lenient_trigger_mode")]
    pub trigger_mode: TriggerMode,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MemsyncConfig {
    /// Parse config JSON; anything malformed yields the defaults.
    pub fn from_json_str(s: &str) -> Self {
        serde_json::from_str(s).unwrap_or_default()
    }
}

/// Empty or unknown `triggerMode` values fall back to the default mode.
fn lenient_trigger_mode<'de, D>(deserializer: D) -> Result<TriggerMode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.parse::<TriggerMode>().ok())
        .unwrap_or_default())
}
