mod cmd_bridge;
mod cmd_config;
mod cmd_reset;
mod cmd_status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "memsync",
    version,
    about = "Track session changes and prompt coding agents to sync memory"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hook entrypoint (called by Claude Code hooks)
    Hook {
        #[command(subcommand)]
        cmd: HookCmd,
    },
    /// Show tracked files, buffered events and gate state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Session whose gate state to report
        #[arg(long)]
        session: Option<String>,
    },
    /// Read or change project settings
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
    /// Clear tracked files, buffered events and gate markers
    Reset {
        /// Only re-arm this session's gate (buffers are still cleared)
        #[arg(long)]
        session: Option<String>,
    },
}

#[derive(Subcommand)]
enum HookCmd {
    /// Claude Code hook entrypoint (reads stdin JSON)
    Claude,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    // Hooks resolve their own project root and must never fail.
    match cli.cmd {
        Command::Hook { cmd } => match cmd {
            HookCmd::Claude => cmd_bridge::hook_claude(),
        },
        Command::Status { json, session } => {
            cmd_status::execute(&std::env::current_dir()?, json, session.as_deref())
        }
        Command::Config { cmd } => cmd_config::run(cmd, &std::env::current_dir()?),
        Command::Reset { session } => {
            cmd_reset::execute(&std::env::current_dir()?, session.as_deref())
        }
    }
}

/// Logs never go to stdout: hook stdout is read by the host.
///
/// `MEMSYNC_DEBUG` routes debug-level logs to `<tmp>/memsync-hook-debug.log`;
/// otherwise `MEMSYNC_LOG` (default `warn`) filters what reaches stderr.
fn init_logging() {
    let default_level = "warn";
    if std::env::var_os("MEMSYNC_DEBUG").is_some() {
        let log_path = std::env::temp_dir().join("memsync-hook-debug.log");
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("debug"))
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .try_init();
            return;
        }
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MEMSYNC_LOG")
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
