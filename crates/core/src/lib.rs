//! # Nova Core
//!
//! Domain types, traits, and error definitions for the Nova terminal
//! assistant. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod memory;
pub mod message;
pub mod provider;
pub mod renderer;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, MemoryError, ProviderError, Result, ToolError};
pub use memory::{MemoryEntry, MemoryStore};
pub use message::{Message, MessageToolCall, Role};
pub use provider::{
    ChatRequest, ChatResponse, Provider, StreamChunk, ToolDefinition, ToolParameter, Usage,
};
pub use renderer::{NullRenderer, Renderer};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
