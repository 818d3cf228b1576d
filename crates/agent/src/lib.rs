//! Session orchestration for Nova.
//!
//! This crate ties the pieces together: the sliding-window transcript
//! (`ContextManager`), slash command dispatch (`CommandHandler`), and the
//! chat/tool loop itself (`AgentLoop`).

pub mod commands;
pub mod context;
pub mod loop_runner;

pub use commands::{CommandHandler, CommandOutcome};
pub use context::ContextManager;
pub use loop_runner::{AgentLoop, TurnOutcome};
