//! Delete file tool — remove a single file.

use async_trait::async_trait;
use std::path::PathBuf;

use nova_core::error::ToolError;
use nova_core::provider::ToolParameter;
use nova_core::tool::{Tool, ToolResult};

use crate::{required_str, resolve_path};

pub struct DeleteFileTool {
    root: PathBuf,
}

impl DeleteFileTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &str {
        "delete_file"
    }

    fn description(&self) -> &str {
        "Delete a file. Directories are refused."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required(
            "path",
            "string",
            "Path to the file, relative to the project root",
        )]
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&arguments, "path")?;
        let resolved = resolve_path(&self.root, path)?;

        match tokio::fs::metadata(&resolved).await {
            Ok(meta) if meta.is_dir() => {
                return Ok(ToolResult::failure(
                    String::new(),
                    format!("'{path}' is a directory; only files can be deleted"),
                ));
            }
            Err(e) => {
                return Ok(ToolResult::failure(
                    String::new(),
                    format!("Failed to stat '{path}': {e}"),
                ));
            }
            Ok(_) => {}
        }

        match tokio::fs::remove_file(&resolved).await {
            Ok(()) => Ok(ToolResult::ok(String::new(), format!("Deleted '{path}'"))),
            Err(e) => Ok(ToolResult::failure(
                String::new(),
                format!("Failed to delete '{path}': {e}"),
            )),
        }
    }
}
