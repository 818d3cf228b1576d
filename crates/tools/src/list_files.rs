//! List files tool — directory listings scoped to the project root.

use async_trait::async_trait;
use std::path::PathBuf;

use nova_core::error::ToolError;
use nova_core::provider::ToolParameter;
use nova_core::tool::{Tool, ToolResult};

use crate::resolve_path;

pub struct ListFilesTool {
    root: PathBuf,
}

impl ListFilesTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List the entries of a directory, directories first, with file sizes."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![
            ToolParameter::optional("path", "string", "Directory to list, relative to the project root")
                .with_default(serde_json::json!(".")),
            ToolParameter::optional("show_hidden", "boolean", "Include dotfiles")
                .with_default(serde_json::json!(false)),
        ]
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["path"].as_str().unwrap_or(".");
        let show_hidden = arguments["show_hidden"].as_bool().unwrap_or(false);
        let resolved = resolve_path(&self.root, path)?;

        let mut read_dir = match tokio::fs::read_dir(&resolved).await {
            Ok(rd) => rd,
            Err(e) => {
                return Ok(ToolResult::failure(
                    String::new(),
                    format!("Failed to list '{path}': {e}"),
                ));
            }
        };

        let mut dirs: Vec<String> = Vec::new();
        let mut files: Vec<String> = Vec::new();

        while let Ok(Some(entry)) = read_dir.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if !show_hidden && name.starts_with('.') {
                continue;
            }
            match entry.metadata().await {
                Ok(meta) if meta.is_dir() => dirs.push(format!("{name}/")),
                Ok(meta) => files.push(format!("{name} ({} bytes)", meta.len())),
                Err(_) => files.push(name),
            }
        }

        dirs.sort();
        files.sort();

        if dirs.is_empty() && files.is_empty() {
            return Ok(ToolResult::ok(String::new(), format!("'{path}' is empty")));
        }

        let mut lines = Vec::with_capacity(dirs.len() + files.len() + 1);
        lines.push(format!("Contents of '{path}':"));
        lines.extend(dirs);
        lines.extend(files);

        Ok(ToolResult::ok(String::new(), lines.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_dirs_before_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]").unwrap();
        std::fs::write(dir.path().join(".hidden"), "x").unwrap();

        let tool = ListFilesTool::new(dir.path().to_path_buf());
        let result = tool.execute(serde_json::json!({})).await.unwrap();

        assert!(result.success);
        let src_pos = result.output.find("src/").unwrap();
        let toml_pos = result.output.find("Cargo.toml").unwrap();
        assert!(src_pos < toml_pos);
        assert!(!result.output.contains(".hidden"));
    }

    #[tokio::test]
    async fn show_hidden_includes_dotfiles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "x").unwrap();

        let tool = ListFilesTool::new(dir.path().to_path_buf());
        let result = tool
            .execute(serde_json::json!({"show_hidden": true}))
            .await
            .unwrap();
        assert!(result.output.contains(".env"));
    }

    #[tokio::test]
    async fn missing_directory_is_failure_text() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ListFilesTool::new(dir.path().to_path_buf());
        let result = tool
            .execute(serde_json::json!({"path": "no_such_dir"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("Failed to list"));
    }
}
