//! Memory stores for Nova.
//!
//! All stores implement `nova_core::MemoryStore` and rank search results
//! by keyword overlap. Three implementations:
//! - `NoopStore` — memory disabled
//! - `InMemoryStore` — ephemeral, for tests
//! - `FileStore` — JSONL persistence across sessions

pub mod file_store;
pub mod in_memory;
pub mod noop;

pub use file_store::FileStore;
pub use in_memory::InMemoryStore;
pub use noop::NoopStore;

use std::path::PathBuf;
use std::sync::Arc;
use nova_core::memory::MemoryStore;

/// Build the configured memory store.
///
/// Falls back to `NoopStore` when memory is disabled or the file store
/// cannot be opened — a broken memory file must not take the session down.
pub fn store_from_config(enabled: bool, path: PathBuf) -> Arc<dyn MemoryStore> {
    if !enabled {
        return Arc::new(NoopStore);
    }
    match FileStore::open(&path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "memory store unavailable, continuing without memory");
            Arc::new(NoopStore)
        }
    }
}

/// Score an entry's content against a query by keyword overlap.
///
/// The score is the fraction of query terms (length > 2, lowercased)
/// found in the content; 0.0 means no overlap.
pub(crate) fn keyword_score(query: &str, content: &str) -> f32 {
    let content_lower = content.to_lowercase();
    let terms: Vec<&str> = query
        .split_whitespace()
        .filter(|t| t.len() > 2)
        .collect();
    if terms.is_empty() {
        return 0.0;
    }
    let matched = terms
        .iter()
        .filter(|t| content_lower.contains(&t.to_lowercase()))
        .count();
    matched as f32 / terms.len() as f32
}
