//! Subprocess execution shared by the VCS and manifest drivers

use crate::error::{RepoCacheError, RepoCacheResult};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished command
#[derive(Debug)]
pub(crate) struct CommandOutput {
    /// Rendered command line, for error messages
    pub command: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Run `program args...` to completion, capturing stdout and stderr.
///
/// Only a failure to spawn is an error here; callers decide what a non-zero
/// exit means for them.
pub(crate) async fn run(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
) -> RepoCacheResult<CommandOutput> {
    let command = render(program, args);
    debug!("Executing: {}", command);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd
        .output()
        .await
        .map_err(|e| RepoCacheError::command_failed(command.clone(), e))?;

    Ok(CommandOutput {
        command,
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

fn render(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
