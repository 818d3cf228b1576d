//! Project structure tool — directory tree of the project root.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use nova_core::error::ToolError;
use nova_core::provider::ToolParameter;
use nova_core::tool::{Tool, ToolResult};

/// Build and dependency directories excluded from the tree.
const SKIP_DIRS: &[&str] = &[
    ".git",
    "target",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "dist",
    "build",
];

pub struct ProjectStructureTool {
    root: PathBuf,
}

impl ProjectStructureTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn walk(
        dir: &Path,
        depth: usize,
        max_depth: usize,
        include_hidden: bool,
        out: &mut Vec<String>,
    ) {
        if depth >= max_depth {
            return;
        }

        let Ok(read_dir) = std::fs::read_dir(dir) else {
            return;
        };

        let mut entries: Vec<_> = read_dir.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| {
            let is_file = e.file_type().map(|t| t.is_file()).unwrap_or(true);
            (is_file, e.file_name())
        });

        for entry in entries {
            let name = entry.file_name().to_string_lossy().to_string();
            if !include_hidden && name.starts_with('.') {
                continue;
            }
            let indent = "  ".repeat(depth);
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                if SKIP_DIRS.contains(&name.as_str()) {
                    continue;
                }
                out.push(format!("{indent}{name}/"));
                Self::walk(&entry.path(), depth + 1, max_depth, include_hidden, out);
            } else {
                out.push(format!("{indent}{name}"));
            }
        }
    }

    /// Render the tree as text (also used at `/init` time).
    pub fn render(root: &Path, max_depth: usize, include_hidden: bool) -> String {
        let mut lines = vec![format!("{}/", root.display())];
        Self::walk(root, 0, max_depth, include_hidden, &mut lines);
        lines.join("\n")
    }
}

#[async_trait]
impl Tool for ProjectStructureTool {
    fn name(&self) -> &str {
        "project_structure"
    }

    fn description(&self) -> &str {
        "Show the project's directory tree, skipping build artifacts and VCS directories."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![
            ToolParameter::optional("max_depth", "integer", "Maximum directory depth")
                .with_default(serde_json::json!(3)),
            ToolParameter::optional("include_hidden", "boolean", "Include dotfiles")
                .with_default(serde_json::json!(false)),
        ]
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let max_depth = arguments["max_depth"].as_u64().unwrap_or(3).clamp(1, 10) as usize;
        let include_hidden = arguments["include_hidden"].as_bool().unwrap_or(false);

        if !self.root.is_dir() {
            return Ok(ToolResult::failure(
                String::new(),
                format!("Project root is not a directory: {}", self.root.display()),
            ));
        }

        Ok(ToolResult::ok(
            String::new(),
            Self::render(&self.root, max_depth, include_hidden),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/util")).unwrap();
        std::fs::create_dir_all(dir.path().join("target/debug")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]").unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.path().join("src/util/helpers.rs"), "").unwrap();
        dir
    }

    #[tokio::test]
    async fn tree_skips_build_and_vcs_dirs() {
        let dir = fixture();
        let tool = ProjectStructureTool::new(dir.path().to_path_buf());
        let result = tool.execute(serde_json::json!({})).await.unwrap();
        assert!(result.success);
        assert!(result.output.contains("src/"));
        assert!(result.output.contains("main.rs"));
        assert!(!result.output.contains("target/"));
        assert!(!result.output.contains(".git"));
    }

    #[tokio::test]
    async fn max_depth_limits_recursion() {
        let dir = fixture();
        let tool = ProjectStructureTool::new(dir.path().to_path_buf());
        let result = tool
            .execute(serde_json::json!({"max_depth": 1}))
            .await
            .unwrap();
        assert!(result.output.contains("src/"));
        assert!(!result.output.contains("helpers.rs"));
    }
}
