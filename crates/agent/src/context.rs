//! Sliding-window transcript management.
//!
//! The context manager owns the session transcript and keeps it bounded:
//! the single system message is pinned, and once the non-system message
//! count exceeds the window size the oldest non-system messages are
//! evicted. Windowing is message-count based; token usage is tracked for
//! status reporting only.

use nova_core::{Message, Role, Usage};
use tracing::debug;

pub struct ContextManager {
    messages: Vec<Message>,
    sliding_window_size: usize,
    total_tokens_used: u64,
}

impl ContextManager {
    pub fn new(sliding_window_size: usize) -> Self {
        Self {
            messages: Vec::new(),
            sliding_window_size: sliding_window_size.max(1),
            total_tokens_used: 0,
        }
    }

    /// Append a message, then evict the oldest non-system messages until
    /// the window holds.
    ///
    /// A tool message without a `tool_call_id` is dropped silently — a
    /// malformed result must not abort the turn, and a tool message the
    /// provider cannot correlate is worse than no message at all.
    pub fn push(&mut self, message: Message) {
        if message.role == Role::Tool && message.tool_call_id.is_none() {
            debug!("dropping tool message without tool_call_id");
            return;
        }
        self.messages.push(message);

        while self.non_system_count() > self.sliding_window_size {
            if let Some(pos) = self.messages.iter().position(|m| m.role != Role::System) {
                let evicted = self.messages.remove(pos);
                debug!(role = %evicted.role, "evicted message from context window");
                self.evict_results_for(&evicted);
            } else {
                break;
            }
        }
    }

    /// When an assistant message carrying tool calls is evicted, its tool
    /// result messages must leave with it. A result whose originating call
    /// is no longer in the transcript is uncorrelatable, and the providers
    /// reject such transcripts before sending anything.
    fn evict_results_for(&mut self, evicted: &Message) {
        if evicted.tool_calls.is_empty() {
            return;
        }
        self.messages.retain(|m| {
            let orphaned = m.role == Role::Tool
                && m.tool_call_id
                    .as_deref()
                    .is_some_and(|id| evicted.tool_calls.iter().any(|c| c.id == id));
            if orphaned {
                debug!(
                    call_id = m.tool_call_id.as_deref().unwrap_or(""),
                    "evicted tool result alongside its originating call"
                );
            }
            !orphaned
        });
    }

    /// Clone the transcript for an in-flight request.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Clear the transcript and zero the token counter.
    pub fn reset(&mut self, preserve_system: bool) {
        if preserve_system {
            self.messages.retain(|m| m.role == Role::System);
        } else {
            self.messages.clear();
        }
        self.total_tokens_used = 0;
    }

    /// Replace the authoritative system message.
    ///
    /// There is at most one; re-initialization replaces it rather than
    /// appending a second.
    pub fn set_system(&mut self, message: Message) {
        self.messages.retain(|m| m.role != Role::System);
        self.messages.insert(0, message);
    }

    /// Replace the system note starting with `prefix`, or append it when
    /// none exists.
    ///
    /// Used for injected context like the project tree, which must be
    /// refreshed rather than stacked when re-injected. The authoritative
    /// system prompt installed by `set_system` is left alone.
    pub fn set_system_note(&mut self, prefix: &str, message: Message) {
        self.messages
            .retain(|m| !(m.role == Role::System && m.content.starts_with(prefix)));
        self.push(message);
    }

    /// Accumulate token usage from a completed response.
    pub fn record_usage(&mut self, usage: &Usage) {
        self.total_tokens_used += u64::from(usage.total_tokens);
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn tokens_used(&self) -> u64 {
        self.total_tokens_used
    }

    pub fn summary(&self) -> String {
        format!(
            "Messages: {}, Tokens used: {}",
            self.messages.len(),
            self.total_tokens_used
        )
    }

    fn non_system_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role != Role::System).count()
    }
}
