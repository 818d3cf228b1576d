//! Read file tool — file contents with optional line ranges.

use async_trait::async_trait;
use std::path::PathBuf;

use nova_core::error::ToolError;
use nova_core::provider::ToolParameter;
use nova_core::tool::{Tool, ToolResult};

use crate::{required_str, resolve_path};

/// Output longer than this is cut off with a truncation note.
const MAX_OUTPUT_CHARS: usize = 10_000;

pub struct ReadFileTool {
    root: PathBuf,
}

impl ReadFileTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

fn truncate(content: String) -> String {
    if content.chars().count() <= MAX_OUTPUT_CHARS {
        return content;
    }
    let cut: String = content.chars().take(MAX_OUTPUT_CHARS).collect();
    format!("{cut}\n... [truncated to {MAX_OUTPUT_CHARS} characters]")
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file. Optionally restrict to a 1-indexed inclusive line range; ranged output includes line numbers."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![
            ToolParameter::required("path", "string", "Path to the file, relative to the project root"),
            ToolParameter::optional("start_line", "integer", "First line to read (1-indexed)"),
            ToolParameter::optional("end_line", "integer", "Last line to read (inclusive)"),
        ]
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&arguments, "path")?;
        let resolved = resolve_path(&self.root, path)?;

        let content = match tokio::fs::read_to_string(&resolved).await {
            Ok(content) => content,
            Err(e) => {
                return Ok(ToolResult::failure(
                    String::new(),
                    format!("Failed to read '{path}': {e}"),
                ));
            }
        };

        let start = arguments["start_line"].as_u64();
        let end = arguments["end_line"].as_u64();

        if start.is_none() && end.is_none() {
            return Ok(ToolResult::ok(String::new(), truncate(content)));
        }

        let lines: Vec<&str> = content.lines().collect();
        let start = start.unwrap_or(1).max(1) as usize;
        let end = end.unwrap_or(lines.len() as u64).min(lines.len() as u64) as usize;

        if start > lines.len() || start > end {
            return Ok(ToolResult::failure(
                String::new(),
                format!(
                    "Invalid line range {start}..{end} for '{path}' ({} lines)",
                    lines.len()
                ),
            ));
        }

        let numbered: Vec<String> = lines[start - 1..end]
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{:>5} | {line}", start + i))
            .collect();

        Ok(ToolResult::ok(String::new(), truncate(numbered.join("\n"))))
    }
}
