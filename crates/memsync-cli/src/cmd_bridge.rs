use std::io::Read;

/// `memsync hook claude`: read stdin, dispatch, print the result.
pub fn hook_claude() -> anyhow::Result<()> {
    let mut stdin_buf = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut stdin_buf) {
        tracing::debug!(error = %e, "stdin read failed");
        return Ok(());
    }

    let preview: String = stdin_buf.chars().take(200).collect();
    tracing::debug!(bytes = stdin_buf.len(), stdin = %preview, "hook stdin");

    match memsync_bridge_claude::hook_entrypoint_from_stdin(&stdin_buf) {
        Ok(result) => {
            match &result.stdout {
                Some(output) => {
                    tracing::debug!(bytes = output.len(), "hook output");
                    print!("{output}");
                }
                None => tracing::debug!("hook ok (no output)"),
            }
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "hook failed");
            // Exit 0 on internal errors: never block the host agent
            Ok(())
        }
    }
}
