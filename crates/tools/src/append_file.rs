//! Append file tool — add content to the end of a file.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use nova_core::error::ToolError;
use nova_core::provider::ToolParameter;
use nova_core::tool::{Tool, ToolResult};

use crate::{required_str, resolve_path};

pub struct AppendFileTool {
    root: PathBuf,
}

impl AppendFileTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl Tool for AppendFileTool {
    fn name(&self) -> &str {
        "append_file"
    }

    fn description(&self) -> &str {
        "Append content to the end of a file, creating it if it does not exist."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![
            ToolParameter::required("path", "string", "Path to the file, relative to the project root"),
            ToolParameter::required("content", "string", "Content to append"),
        ]
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&arguments, "path")?;
        let content = required_str(&arguments, "content")?;
        let resolved = resolve_path(&self.root, path)?;

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&resolved)
            .await;

        match file {
            Ok(mut file) => match file.write_all(content.as_bytes()).await {
                Ok(()) => Ok(ToolResult::ok(
                    String::new(),
                    format!("Appended {} bytes to '{path}'", content.len()),
                )),
                Err(e) => Ok(ToolResult::failure(
                    String::new(),
                    format!("Failed to append to '{path}': {e}"),
                )),
            },
            Err(e) => Ok(ToolResult::failure(
                String::new(),
                format!("Failed to open '{path}': {e}"),
            )),
        }
    }
}
