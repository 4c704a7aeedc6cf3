use std::process::Stdio;

use tokio::process::Command;

#[derive(Debug, Clone)]
pub(crate) struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout and stderr joined, for classifiers that do not care which stream spoke
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Run a device tool directly (no shell) and capture its output
pub(crate) async fn run(program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
    tracing::debug!(program, ?args, "Running device command");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await?;

    Ok(CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
