//! Session-level presentation state.

use std::collections::VecDeque;

const ACTIVITY_CAP: usize = 5;

/// A ring of the last few things that happened, shown in the header.
#[derive(Debug, Default)]
pub struct RecentActivity {
    entries: VecDeque<String>,
}

impl RecentActivity {
    pub fn push(&mut self, entry: impl Into<String>) {
        if self.entries.len() == ACTIVITY_CAP {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.into());
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the terminal front-end tracks across a session.
#[derive(Debug, Default)]
pub struct TuiState {
    pub activity: RecentActivity,
    pub turns: u64,
    pub tool_calls: u64,
}

impl TuiState {
    pub fn record_turn(&mut self) {
        self.turns += 1;
    }

    pub fn record_tool_call(&mut self, name: &str) {
        self.tool_calls += 1;
        self.activity.push(format!("tool: {name}"));
    }
}
