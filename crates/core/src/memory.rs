//! MemoryStore trait — long-term knowledge across sessions.
//!
//! The memory system lets the assistant remember user preferences and
//! context between runs. Backends are keyword-scored stores; every failure
//! degrades gracefully — memory is never allowed to take a session down.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::MemoryError;

/// A single memory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Unique ID for this memory
    pub id: String,

    /// The content of the memory
    pub content: String,

    /// Tags for categorization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// When this memory was created
    pub created_at: DateTime<Utc>,

    /// Relevance score (set by search operations)
    #[serde(default)]
    pub score: f32,
}

impl MemoryEntry {
    pub fn new(content: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            tags,
            created_at: Utc::now(),
            score: 0.0,
        }
    }
}

/// The core MemoryStore trait.
///
/// Implementations: JSON file store, in-memory (for testing), no-op.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The store name (e.g., "file", "memory", "none").
    fn name(&self) -> &str;

    /// Store a new memory, returning its ID.
    async fn add(&self, content: &str, tags: Vec<String>) -> std::result::Result<String, MemoryError>;

    /// Search memories by keyword relevance, best matches first.
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<MemoryEntry>, MemoryError>;

    /// List stored memories, most recent first.
    async fn all(&self, limit: usize) -> std::result::Result<Vec<MemoryEntry>, MemoryError>;

    /// Delete a memory by ID. Returns false if no such memory exists.
    async fn delete(&self, id: &str) -> std::result::Result<bool, MemoryError>;

    /// Delete every stored memory.
    async fn delete_all(&self) -> std::result::Result<(), MemoryError>;

    /// Total memory count.
    async fn count(&self) -> std::result::Result<usize, MemoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_entry_serialization() {
        let entry = MemoryEntry::new("The user prefers Rust over C++", vec!["preference".into()]);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("Rust over C++"));
        assert!(json.contains("preference"));
    }
}
