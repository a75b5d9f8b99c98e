use std::path::PathBuf;

use serde_json::Value;

// ── Hook stdin parsing ──

/// Parse the stdin JSON from a Claude Code hook.
///
/// Absent or malformed input (or a non-object) is treated as `{}`.
pub(crate) fn parse_hook_stdin(stdin: &str) -> Value {
    match serde_json::from_str::<Value>(stdin) {
        Ok(v @ Value::Object(_)) => v,
        Ok(_) => empty_object(),
        Err(e) => {
            if !stdin.trim().is_empty() {
                tracing::debug!(error = %e, "malformed hook payload, treating as {{}}");
            }
            empty_object()
        }
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Get a string field from JSON, trying snake_case first then camelCase.
pub(crate) fn get_str(v: &Value, snake_key: &str) -> String {
    get_field(v, snake_key)
        .and_then(|x| x.as_str())
        .unwrap_or("")
        .to_string()
}

/// Get any field, snake_case first then camelCase.
pub(crate) fn get_field<'a>(v: &'a Value, snake_key: &str) -> Option<&'a Value> {
    v.get(snake_key)
        .or_else(|| v.get(snake_to_camel(snake_key)))
}

pub(crate) fn snake_to_camel(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;
    for ch in s.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}

// ── Project root ──

/// `CLAUDE_PROJECT_DIR`, else the payload's `cwd`, else the process cwd.
pub(crate) fn resolve_project_root(payload_cwd: &str) -> PathBuf {
    if let Ok(dir) = std::env::var("CLAUDE_PROJECT_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    if !payload_cwd.is_empty() {
        return PathBuf::from(payload_cwd);
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snake_to_camel_converts_correctly() {
        assert_eq!(snake_to_camel("hook_event_name"), "hookEventName");
        assert_eq!(snake_to_camel("session_id"), "sessionId");
        assert_eq!(snake_to_camel("tool_input"), "toolInput");
        assert_eq!(snake_to_camel("cwd"), "cwd");
        assert_eq!(snake_to_camel("tool_name"), "toolName");
    }

    #[test]
    fn malformed_stdin_is_empty_object() {
        assert_eq!(parse_hook_stdin(""), json!({}));
        assert_eq!(parse_hook_stdin("not json"), json!({}));
        assert_eq!(parse_hook_stdin("[1,2]"), json!({}));
        assert_eq!(parse_hook_stdin("\"str\""), json!({}));
    }

    #[test]
    fn get_str_prefers_snake_then_camel() {
        let v = json!({"session_id": "snake", "sessionId": "camel", "toolName": "Bash"});
        assert_eq!(get_str(&v, "session_id"), "snake");
        assert_eq!(get_str(&v, "tool_name"), "Bash");
        assert_eq!(get_str(&v, "cwd"), "");
        assert_eq!(get_str(&json!({"cwd": 3}), "cwd"), "");
    }

    #[test]
    fn get_field_reads_camel_objects() {
        let v = json!({"toolInput": {"command": "ls"}});
        assert_eq!(get_field(&v, "tool_input").unwrap()["command"], "ls");
        assert!(get_field(&v, "missing").is_none());
    }
}
