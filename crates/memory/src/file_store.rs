//! File-backed memory store — one JSON entry per line.
//!
//! The whole file is loaded at startup and rewritten on every mutation.
//! Memory files are small (hundreds of entries, not millions), so the
//! simplicity is worth more than incremental appends.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use nova_core::{MemoryEntry, MemoryError, MemoryStore};
use tokio::sync::RwLock;
use tracing::warn;

use crate::keyword_score;

pub struct FileStore {
    path: PathBuf,
    entries: Arc<RwLock<Vec<MemoryEntry>>>,
}

impl FileStore {
    /// Open (or create) the store at `path`. Corrupted lines are skipped
    /// with a warning rather than failing the whole load.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MemoryError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MemoryError::Storage(format!("create {}: {e}", parent.display())))?;
        }

        let mut entries = Vec::new();
        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| MemoryError::Storage(format!("read {}: {e}", path.display())))?;
            for (lineno, line) in raw.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<MemoryEntry>(line) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => {
                        warn!(path = %path.display(), line = lineno + 1, error = %e, "skipping corrupted memory entry");
                    }
                }
            }
        }

        Ok(Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    fn flush(&self, entries: &[MemoryEntry]) -> Result<(), MemoryError> {
        let mut out = String::new();
        for entry in entries {
            let line = serde_json::to_string(entry)
                .map_err(|e| MemoryError::Storage(format!("serialize entry: {e}")))?;
            out.push_str(&line);
            out.push('\n');
        }
        std::fs::write(&self.path, out)
            .map_err(|e| MemoryError::Storage(format!("write {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl MemoryStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn add(&self, content: &str, tags: Vec<String>) -> Result<String, MemoryError> {
        let entry = MemoryEntry::new(content, tags);
        let id = entry.id.clone();
        let mut entries = self.entries.write().await;
        entries.push(entry);
        self.flush(&entries)?;
        Ok(id)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MemoryEntry>, MemoryError> {
        let entries = self.entries.read().await;
        let mut scored: Vec<MemoryEntry> = entries
            .iter()
            .filter_map(|e| {
                let score = keyword_score(query, &e.content);
                if score > 0.0 {
                    let mut hit = e.clone();
                    hit.score = score;
                    Some(hit)
                } else {
                    None
                }
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn all(&self, limit: usize) -> Result<Vec<MemoryEntry>, MemoryError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }

    async fn delete(&self, id: &str) -> Result<bool, MemoryError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        let removed = entries.len() < before;
        if removed {
            self.flush(&entries)?;
        }
        Ok(removed)
    }

    async fn delete_all(&self) -> Result<(), MemoryError> {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.flush(&entries)
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.entries.read().await.len())
    }
}
