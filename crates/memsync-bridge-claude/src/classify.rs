use serde_json::Value;

use crate::parse::{get_field, get_str};

/// A PostToolUse payload decoded into what the recorder cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ToolInvocation {
    /// File-editing tool with a non-empty target path.
    Edit { tool_name: String, path: String },
    /// `Bash` with a string command.
    Shell { command: String },
    /// No tool name, but a `file_path` in the input.
    DirectFile { path: String },
    Unrecognized,
}

impl ToolInvocation {
    /// Decode from the whole hook payload (`tool_name` + `tool_input`).
    pub(crate) fn from_payload(raw: &Value) -> Self {
        let tool_name = get_str(raw, "tool_name");
        let input = get_field(raw, "tool_input").unwrap_or(&Value::Null);
        Self::decode(&tool_name, input)
    }

    pub(crate) fn decode(tool_name: &str, input: &Value) -> Self {
        let text = |key: &str| {
            get_field(input, key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match tool_name {
            "Edit" | "Write" | "MultiEdit" => match text("file_path") {
                Some(path) => ToolInvocation::Edit {
                    tool_name: tool_name.to_string(),
                    path,
                },
                None => ToolInvocation::Unrecognized,
            },
            "NotebookEdit" => match text("notebook_path") {
                Some(path) => ToolInvocation::Edit {
                    tool_name: tool_name.to_string(),
                    path,
                },
                None => ToolInvocation::Unrecognized,
            },
            "Bash" => match get_field(input, "command").and_then(|v| v.as_str()) {
                Some(command) => ToolInvocation::Shell {
                    command: command.to_string(),
                },
                None => ToolInvocation::Unrecognized,
            },
            "" => match text("file_path") {
                Some(path) => ToolInvocation::DirectFile { path },
                None => ToolInvocation::Unrecognized,
            },
            _ => ToolInvocation::Unrecognized,
        }
    }

    /// Tool name recorded in the session event.
    pub(crate) fn tool_name(&self) -> &str {
        match self {
            ToolInvocation::Edit { tool_name, .. } => tool_name,
            ToolInvocation::Shell { .. } => "Bash",
            ToolInvocation::DirectFile { .. } | ToolInvocation::Unrecognized => "",
        }
    }

    /// Whether this is a shell command that creates a commit.
    pub(crate) fn is_commit(&self) -> bool {
        matches!(self, ToolInvocation::Shell { command } if command.contains("git commit"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_edit_class_tools() {
        for tool in ["Edit", "Write", "MultiEdit"] {
            let inv = ToolInvocation::decode(tool, &json!({"file_path": "/p/a.rs"}));
            assert_eq!(
                inv,
                ToolInvocation::Edit {
                    tool_name: tool.to_string(),
                    path: "/p/a.rs".to_string()
                }
            );
        }
        let nb = ToolInvocation::decode("NotebookEdit", &json!({"notebook_path": "n.ipynb"}));
        assert_eq!(
            nb,
            ToolInvocation::Edit {
                tool_name: "NotebookEdit".to_string(),
                path: "n.ipynb".to_string()
            }
        );
    }

    #[test]
    fn missing_or_empty_path_is_unrecognized() {
        assert_eq!(
            ToolInvocation::decode("Edit", &json!({})),
            ToolInvocation::Unrecognized
        );
        assert_eq!(
            ToolInvocation::decode("Write", &json!({"file_path": "  "})),
            ToolInvocation::Unrecognized
        );
        assert_eq!(
            ToolInvocation::decode("NotebookEdit", &json!({"file_path": "x"})),
            ToolInvocation::Unrecognized
        );
    }

    #[test]
    fn decodes_shell_and_direct() {
        assert_eq!(
            ToolInvocation::decode("Bash", &json!({"command": "rm a"})),
            ToolInvocation::Shell {
                command: "rm a".to_string()
            }
        );
        assert_eq!(
            ToolInvocation::decode("Bash", &json!({"command": 7})),
            ToolInvocation::Unrecognized
        );
        assert_eq!(
            ToolInvocation::decode("", &json!({"file_path": "x.rs"})),
            ToolInvocation::DirectFile {
                path: "x.rs".to_string()
            }
        );
        assert_eq!(
            ToolInvocation::decode("Read", &json!({"file_path": "x.rs"})),
            ToolInvocation::Unrecognized
        );
    }

    #[test]
    fn from_payload_accepts_camel_case() {
        let raw = json!({"toolName": "Edit", "toolInput": {"filePath": "/p/b.rs"}});
        assert_eq!(
            ToolInvocation::from_payload(&raw),
            ToolInvocation::Edit {
                tool_name: "Edit".to_string(),
                path: "/p/b.rs".to_string()
            }
        );
        assert_eq!(ToolInvocation::from_payload(&json!({})), ToolInvocation::Unrecognized);
    }

    #[test]
    fn commit_detection() {
        let commit = ToolInvocation::Shell {
            command: "git add -A && git commit -m 'x'".to_string(),
        };
        assert!(commit.is_commit());
        let other = ToolInvocation::Shell {
            command: "git status".to_string(),
        };
        assert!(!other.is_commit());
    }
}
