//! Run command tool — shell execution with a hard timeout.
//!
//! A non-zero exit code is a normal result the model can reason about;
//! only spawn failures and timeouts surface as tool errors.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use nova_core::error::ToolError;
use nova_core::provider::ToolParameter;
use nova_core::tool::{Tool, ToolResult};

use crate::{required_str, resolve_path};

pub struct RunCommandTool {
    root: PathBuf,
    default_timeout_secs: u64,
}

impl RunCommandTool {
    pub fn new(root: PathBuf, default_timeout_secs: u64) -> Self {
        Self {
            root,
            default_timeout_secs,
        }
    }
}

#[async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &str {
        "run_command"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return its stdout, stderr, and exit code. Long-running commands are killed at the timeout."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![
            ToolParameter::required("command", "string", "The shell command to execute"),
            ToolParameter::optional("cwd", "string", "Working directory, relative to the project root"),
            ToolParameter::optional("timeout_secs", "integer", "Timeout in seconds")
                .with_default(serde_json::json!(30)),
        ]
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let command = required_str(&arguments, "command")?;
        let timeout_secs = arguments["timeout_secs"]
            .as_u64()
            .unwrap_or(self.default_timeout_secs);
        let cwd = match arguments["cwd"].as_str() {
            Some(dir) => resolve_path(&self.root, dir)?,
            None => self.root.clone(),
        };

        debug!(command = %command, cwd = %cwd.display(), timeout_secs, "Executing command");

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };
        cmd.current_dir(&cwd).kill_on_drop(true);

        let output = tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output()).await;

        let output = match output {
            Err(_) => {
                warn!(command = %command, timeout_secs, "Command timed out");
                return Err(ToolError::Timeout {
                    tool_name: "run_command".into(),
                    timeout_secs,
                });
            }
            Ok(Err(e)) => {
                return Err(ToolError::ExecutionFailed {
                    tool_name: "run_command".into(),
                    reason: e.to_string(),
                });
            }
            Ok(Ok(output)) => output,
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let code = output.status.code().unwrap_or(-1);

        Ok(ToolResult {
            call_id: String::new(),
            success: output.status.success(),
            output: format!(
                "STDOUT:\n{}\nSTDERR:\n{}\nExit code: {code}",
                stdout.trim_end(),
                stderr.trim_end()
            ),
        })
    }
}
