//! Terminal front-end for Nova.
//!
//! Everything here is presentation: the agent loop talks to it only
//! through `nova_core::Renderer`, and the only thing that flows back is
//! the raw input line.

pub mod input;
pub mod panel;
pub mod renderer;
pub mod state;

pub use input::{editor, read_input, InputEvent, NovaHelper};
pub use renderer::TuiRenderer;
pub use state::{RecentActivity, TuiState};
