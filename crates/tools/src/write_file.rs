//! Write file tool — create or overwrite a file.

use async_trait::async_trait;
use std::path::PathBuf;

use nova_core::error::ToolError;
use nova_core::provider::ToolParameter;
use nova_core::tool::{Tool, ToolResult};

use crate::{required_str, resolve_path};

pub struct WriteFileTool {
    root: PathBuf,
}

impl WriteFileTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file, creating it if needed and overwriting any existing content."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![
            ToolParameter::required("path", "string", "Path to the file, relative to the project root"),
            ToolParameter::required("content", "string", "Full content to write"),
            ToolParameter::optional("create_dirs", "boolean", "Create missing parent directories")
                .with_default(serde_json::json!(true)),
        ]
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&arguments, "path")?;
        let content = required_str(&arguments, "content")?;
        let create_dirs = arguments["create_dirs"].as_bool().unwrap_or(true);
        let resolved = resolve_path(&self.root, path)?;

        let existed = resolved.exists();

        if create_dirs {
            if let Some(parent) = resolved.parent() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    return Ok(ToolResult::failure(
                        String::new(),
                        format!("Failed to create directories for '{path}': {e}"),
                    ));
                }
            }
        }

        match tokio::fs::write(&resolved, content).await {
            Ok(()) => {
                let verb = if existed { "Updated" } else { "Created" };
                Ok(ToolResult::ok(
                    String::new(),
                    format!(
                        "{verb} '{path}' ({} lines, {} bytes)",
                        content.lines().count(),
                        content.len()
                    ),
                ))
            }
            Err(e) => Ok(ToolResult::failure(
                String::new(),
                format!("Failed to write '{path}': {e}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(dir.path().to_path_buf());
        let result = tool
            .execute(serde_json::json!({"path": "out.txt", "content": "a\nb\n"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.starts_with("Created"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("out.txt")).unwrap(),
            "a\nb\n"
        );
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("out.txt"), "old").unwrap();
        let tool = WriteFileTool::new(dir.path().to_path_buf());
        let result = tool
            .execute(serde_json::json!({"path": "out.txt", "content": "new"}))
            .await
            .unwrap();
        assert!(result.output.starts_with("Updated"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("out.txt")).unwrap(),
            "new"
        );
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(dir.path().to_path_buf());
        let result = tool
            .execute(serde_json::json!({"path": "a/b/c.txt", "content": "deep"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(dir.path().join("a/b/c.txt").exists());
    }

    #[tokio::test]
    async fn escape_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(dir.path().to_path_buf());
        let result = tool
            .execute(serde_json::json!({"path": "../evil.txt", "content": "x"}))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
