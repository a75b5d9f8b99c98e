//! File-mutation targets of a shell command.
//!
//! Precision over recall: only a handful of commands whose operands are
//! unambiguously files are recognized. Everything else yields nothing.

/// Result of inspecting one shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ShellTargets {
    /// Raw operand tokens (unresolved) of a recognized mutating command.
    Paths(Vec<String>),
    /// Leading command is on the read-only list.
    ReadOnly,
    /// Parsed fine, but no extraction rule applies.
    Untracked,
    /// Empty command or unbalanced quoting.
    Unparseable,
}

impl ShellTargets {
    pub(crate) fn into_paths(self) -> Vec<String> {
        match self {
            ShellTargets::Paths(p) => p,
            _ => Vec::new(),
        }
    }
}

/// Leading token sequences of commands that never mutate tracked files.
const READ_ONLY_PREFIXES: &[&[&str]] = &[
    &["ls"],
    &["cat"],
    &["echo"],
    &["grep"],
    &["find"],
    &["head"],
    &["tail"],
    &["less"],
    &["more"],
    &["cd"],
    &["pwd"],
    &["which"],
    &["whereis"],
    &["type"],
    &["file"],
    &["stat"],
    &["wc"],
    &["git", "status"],
    &["git", "log"],
    &["git", "diff"],
    &["git", "show"],
    &["git", "branch"],
    &["git", "fetch"],
    &["git", "pull"],
    &["git", "push"],
    &["git", "clone"],
    &["git", "checkout"],
    &["git", "stash"],
    &["git", "remote"],
    &["git", "tag"],
    &["git", "rev-parse"],
    &["npm"],
    &["yarn"],
    &["pnpm"],
    &["node"],
    &["python"],
    &["python3"],
    &["pip"],
    &["uv"],
    &["cargo"],
    &["go"],
    &["make"],
    &["cmake"],
    &["docker"],
    &["kubectl"],
    &["curl"],
    &["wget"],
    &["ssh"],
    &["scp"],
    &["rsync"],
];

#[derive(Debug, Clone, Copy)]
enum Extract {
    /// Every operand up to the first control token (`rm`).
    AllOperands,
    /// Only the first operand: the rename source (`mv`).
    FirstOperand,
    /// The token right after the command (`unlink`).
    SingleArg,
}

struct CommandRule {
    prefix: &'static [&'static str],
    /// Minimum total token count, prefix included.
    min_tokens: usize,
    extract: Extract,
}

const COMMAND_RULES: &[CommandRule] = &[
    CommandRule {
        prefix: &["rm"],
        min_tokens: 1,
        extract: Extract::AllOperands,
    },
    CommandRule {
        prefix: &["git", "rm"],
        min_tokens: 2,
        extract: Extract::AllOperands,
    },
    CommandRule {
        prefix: &["mv"],
        min_tokens: 3,
        extract: Extract::FirstOperand,
    },
    CommandRule {
        prefix: &["git", "mv"],
        min_tokens: 3,
        extract: Extract::FirstOperand,
    },
    CommandRule {
        prefix: &["unlink"],
        min_tokens: 2,
        extract: Extract::SingleArg,
    },
];

/// Operators that end a simple command.
const CONTROL_OPERATORS: &[&str] = &["&&", "||", ";", "|", "&"];

/// Token prefixes that start a redirection.
const REDIRECT_PREFIXES: &[&str] = &[">", ">>", "<", "1>", "1>>", "2>", "2>>", "2>&1"];

/// Classify a shell command and pull out the files it mutates.
pub(crate) fn extract_targets(command: &str) -> ShellTargets {
    let command = command.trim();
    if command.is_empty() {
        return ShellTargets::Unparseable;
    }
    let Some(tokens) = shlex::split(command) else {
        return ShellTargets::Unparseable;
    };
    if tokens.is_empty() {
        return ShellTargets::Unparseable;
    }

    if READ_ONLY_PREFIXES.iter().any(|p| starts_with(&tokens, p)) {
        return ShellTargets::ReadOnly;
    }

    for rule in COMMAND_RULES {
        if starts_with(&tokens, rule.prefix) && tokens.len() >= rule.min_tokens {
            let args = &tokens[rule.prefix.len()..];
            return ShellTargets::Paths(apply(rule.extract, args));
        }
    }
    ShellTargets::Untracked
}

fn starts_with(tokens: &[String], prefix: &[&str]) -> bool {
    tokens.len() >= prefix.len() && tokens.iter().zip(prefix).all(|(t, p)| t == p)
}

/// Whether a token ends the command's operand list.
pub(crate) fn is_shell_syntax(token: &str) -> bool {
    CONTROL_OPERATORS.contains(&token) || REDIRECT_PREFIXES.iter().any(|p| token.starts_with(p))
}

fn apply(extract: Extract, args: &[String]) -> Vec<String> {
    if let Extract::SingleArg = extract {
        return match args.first() {
            Some(t) if !is_shell_syntax(t) => {
                let (stem, _) = split_terminator(t);
                if stem.is_empty() {
                    Vec::new()
                } else {
                    vec![stem.to_string()]
                }
            }
            _ => Vec::new(),
        };
    }

    let mut files = Vec::new();
    let mut options_done = false;
    for token in args {
        if is_shell_syntax(token) {
            break;
        }
        let (stem, terminated) = split_terminator(token);
        if !options_done && stem == "--" {
            options_done = true;
        } else if !stem.is_empty() && (options_done || !stem.starts_with('-')) {
            files.push(stem.to_string());
            if let Extract::FirstOperand = extract {
                break;
            }
        }
        if terminated {
            break;
        }
    }
    files
}

/// `a.txt;` → (`a.txt`, true): a glued `;` still ends the command.
fn split_terminator(token: &str) -> (&str, bool) {
    match token.strip_suffix(';') {
        Some(stem) => (stem, true),
        None => (token, false),
    }
}
