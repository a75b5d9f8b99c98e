mod classify;
mod dispatch;
mod engine;
mod gate;
mod git;
mod parse;
mod paths;
mod process;
mod recorder;
mod render;
mod shell;

// Re-export public API (CLI consumers)
pub use dispatch::{hook_entrypoint_from_stdin, HookResult};
pub use gate::StopDecision;
