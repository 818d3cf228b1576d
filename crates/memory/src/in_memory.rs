//! In-memory store — volatile, mainly for tests and ephemeral sessions.

use std::sync::Arc;

use async_trait::async_trait;
use nova_core::{MemoryEntry, MemoryError, MemoryStore};
use tokio::sync::RwLock;

use crate::keyword_score;

/// A memory store backed by a `Vec` behind an async `RwLock`. Nothing
/// survives process exit.
pub struct InMemoryStore {
    entries: Arc<RwLock<Vec<MemoryEntry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn add(&self, content: &str, tags: Vec<String>) -> Result<String, MemoryError> {
        let entry = MemoryEntry::new(content, tags);
        let id = entry.id.clone();
        self.entries.write().await.push(entry);
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
        Ok(entries.len() < before)
    }

    async fn delete_all(&self) -> Result<(), MemoryError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.entries.read().await.len())
    }
}
