//! Built-in tool implementations for Nova.
//!
//! Tools give the assistant the ability to interact with the world:
//! list, read, and modify files, run shell commands, search the web,
//! and inspect the project layout.
//!
//! Every filesystem tool resolves paths against a project root and
//! refuses to step outside it.

pub mod append_file;
pub mod delete_file;
pub mod list_files;
pub mod project_structure;
pub mod read_file;
pub mod run_command;
pub mod web_search;
pub mod write_file;

use std::path::{Component, Path, PathBuf};

use nova_core::error::ToolError;
use nova_core::tool::ToolRegistry;

/// Resolve a user-supplied path against the project root.
///
/// Relative paths join the root; absolute paths are accepted only when
/// they already live under it. `..` components are normalized before the
/// containment check, so traversal cannot escape.
pub(crate) fn resolve_path(root: &Path, path: &str) -> Result<PathBuf, ToolError> {
    let candidate = Path::new(path);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(ToolError::InvalidArguments(format!(
                        "path escapes the project root: {path}"
                    )));
                }
            }
            Component::CurDir => {}
            other => normalized.push(other),
        }
    }

    if !normalized.starts_with(root) {
        return Err(ToolError::InvalidArguments(format!(
            "path is outside the project root: {path}"
        )));
    }

    Ok(normalized)
}

/// Required string argument helper.
pub(crate) fn required_str<'a>(
    arguments: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, ToolError> {
    arguments[key]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{key}' argument")))
}

/// Create a default tool registry with all built-in tools.
///
/// All filesystem tools are scoped to `project_root`; `run_command` uses
/// `command_timeout_secs` when the model does not pass its own timeout.
pub fn default_registry(project_root: &Path, command_timeout_secs: u64) -> ToolRegistry {
    let root = project_root.to_path_buf();
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(list_files::ListFilesTool::new(root.clone())));
    registry.register(Box::new(read_file::ReadFileTool::new(root.clone())));
    registry.register(Box::new(write_file::WriteFileTool::new(root.clone())));
    registry.register(Box::new(append_file::AppendFileTool::new(root.clone())));
    registry.register(Box::new(delete_file::DeleteFileTool::new(root.clone())));
    registry.register(Box::new(run_command::RunCommandTool::new(
        root.clone(),
        command_timeout_secs,
    )));
    registry.register(Box::new(project_structure::ProjectStructureTool::new(root)));
    registry.register(Box::new(web_search::WebSearchTool::new()));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_path() {
        let root = Path::new("/work/project");
        let resolved = resolve_path(root, "src/main.rs").unwrap();
        assert_eq!(resolved, Path::new("/work/project/src/main.rs"));
    }

    #[test]
    fn resolve_normalizes_dot_segments() {
        let root = Path::new("/work/project");
        let resolved = resolve_path(root, "src/./util/../main.rs").unwrap();
        assert_eq!(resolved, Path::new("/work/project/src/main.rs"));
    }

    #[test]
    fn resolve_rejects_escape() {
        let root = Path::new("/work/project");
        assert!(resolve_path(root, "../secrets.txt").is_err());
        assert!(resolve_path(root, "/etc/passwd").is_err());
    }

    #[test]
    fn default_registry_has_all_tools() {
        let registry = default_registry(Path::new("/tmp"), 30);
        assert_eq!(
            registry.names(),
            vec![
                "append_file",
                "delete_file",
                "list_files",
                "project_structure",
                "read_file",
                "run_command",
                "web_search",
                "write_file",
            ]
        );
    }
}
