//! The crossterm-backed `Renderer` implementation.

use std::io::stdout;
use std::sync::Mutex;
use std::time::Duration;

use crossterm::execute;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use indicatif::{ProgressBar, ProgressStyle};
use nova_core::{Renderer, Role};

use crate::panel::panel;
use crate::state::TuiState;

pub struct TuiRenderer {
    model: String,
    provider: String,
    spinner: Mutex<Option<ProgressBar>>,
    state: Mutex<TuiState>,
}

impl TuiRenderer {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            provider: provider.into(),
            spinner: Mutex::new(None),
            state: Mutex::new(TuiState::default()),
        }
    }

    fn stop_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(spinner) = guard.take() {
                spinner.finish_and_clear();
            }
        }
    }

    /// Snapshot the recent activity lines for the header.
    fn recent_lines(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.activity.entries().map(String::from).collect())
            .unwrap_or_default()
    }
}

impl Renderer for TuiRenderer {
    fn header(&self) {
        let _ = execute!(stdout(), Clear(ClearType::All), crossterm::cursor::MoveTo(0, 0));
        println!();
        println!(
            "{}  ✦ Nova{}  — {} via {}",
            SetForegroundColor(Color::Magenta),
            ResetColor,
            self.model,
            self.provider
        );
        let recent = self.recent_lines();
        if !recent.is_empty() {
            println!(
                "{}  recent: {}{}",
                SetForegroundColor(Color::DarkGrey),
                recent.join(", "),
                ResetColor
            );
        }
        println!(
            "{}  Type a message, /help for commands, /quit to leave.{}",
            SetForegroundColor(Color::DarkGrey),
            ResetColor
        );
        println!();
    }

    fn message(&self, role: Role, text: &str) {
        self.stop_spinner();
        match role {
            Role::Assistant => {
                if let Ok(mut state) = self.state.lock() {
                    state.record_turn();
                }
                println!();
                panel(Some("Nova"), text, Color::Magenta);
                println!();
            }
            Role::System => {
                println!(
                    "{}{text}{}",
                    SetForegroundColor(Color::DarkGrey),
                    ResetColor
                );
            }
            Role::User | Role::Tool => {
                // The input line already echoes the user; tool output goes
                // through tool_call().
            }
        }
    }

    fn error(&self, text: &str, title: Option<&str>) {
        self.stop_spinner();
        panel(title.or(Some("Error")), text, Color::Red);
    }

    fn success(&self, text: &str, title: Option<&str>) {
        self.stop_spinner();
        panel(title, text, Color::Green);
    }

    fn info(&self, text: &str, title: Option<&str>) {
        self.stop_spinner();
        panel(title, text, Color::Blue);
    }

    fn tool_call(&self, name: &str, arguments: &str, result: Option<&str>) {
        self.stop_spinner();
        if let Ok(mut state) = self.state.lock() {
            state.record_tool_call(name);
        }
        println!(
            "{}  ⚙ {name}({arguments}){}",
            SetForegroundColor(Color::Yellow),
            ResetColor
        );
        if let Some(result) = result {
            let mut preview: String = result.chars().take(200).collect();
            if result.chars().count() > 200 {
                preview.push('…');
            }
            for line in preview.lines() {
                println!(
                    "{}    {line}{}",
                    SetForegroundColor(Color::DarkGrey),
                    ResetColor
                );
            }
        }
    }

    fn thinking(&self, on: bool, label: &str) {
        if !on {
            self.stop_spinner();
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.dim} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(label.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(old) = guard.replace(spinner) {
                old.finish_and_clear();
            }
        }
    }
}
