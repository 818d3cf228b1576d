//! Renderer trait — the presentation boundary.
//!
//! The agent loop never prints. Everything the user sees goes through this
//! trait, so the terminal front-end can be swapped for a silent one in
//! tests without touching orchestration logic.

use crate::message::Role;

/// Presentation hooks consumed by the agent loop.
pub trait Renderer: Send + Sync {
    /// Draw the session header (banner, model, hints).
    fn header(&self);

    /// Render a transcript message.
    fn message(&self, role: Role, text: &str);

    /// Render an error panel.
    fn error(&self, text: &str, title: Option<&str>);

    /// Render a success panel.
    fn success(&self, text: &str, title: Option<&str>);

    /// Render an informational panel.
    fn info(&self, text: &str, title: Option<&str>);

    /// Render a tool invocation and, once available, its result.
    fn tool_call(&self, name: &str, arguments: &str, result: Option<&str>);

    /// Toggle the "thinking" indicator with a status label.
    fn thinking(&self, on: bool, label: &str);
}

/// A renderer that swallows everything. Used in tests and one-shot mode.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn header(&self) {}
    fn message(&self, _role: Role, _text: &str) {}
    fn error(&self, _text: &str, _title: Option<&str>) {}
    fn success(&self, _text: &str, _title: Option<&str>) {}
    fn info(&self, _text: &str, _title: Option<&str>) {}
    fn tool_call(&self, _name: &str, _arguments: &str, _result: Option<&str>) {}
    fn thinking(&self, _on: bool, _label: &str) {}
}
