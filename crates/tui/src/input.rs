//! The input line: a rustyline editor with slash-command completion.

use std::borrow::Cow;

use rustyline::completion::{Completer, Pair};
use rustyline::config::{CompletionType, Config};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Editor, Helper};

const COMMANDS: &[&str] = &[
    "/help", "/tools", "/clear", "/status", "/config", "/model", "/init",
    "/memory", "/memory search", "/remember", "/forget", "/quit", "/exit",
];

/// Completion, hinting, and highlighting for the prompt.
pub struct NovaHelper;

impl Completer for NovaHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let partial = &line[..pos];
        if !partial.starts_with('/') {
            return Ok((pos, Vec::new()));
        }
        let matches = COMMANDS
            .iter()
            .filter(|c| c.starts_with(partial))
            .map(|c| Pair {
                display: c.to_string(),
                replacement: c[partial.len()..].to_string(),
            })
            .collect();
        Ok((pos, matches))
    }
}

impl Hinter for NovaHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if line.is_empty() || pos < line.len() || !line.starts_with('/') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|c| c.starts_with(line) && **c != line)
            .map(|c| c[line.len()..].to_string())
    }
}

impl Highlighter for NovaHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{hint}\x1b[0m"))
    }
}

impl Validator for NovaHelper {
    fn validate(&self, _ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

impl Helper for NovaHelper {}

/// What came out of one prompt read.
#[derive(Debug, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl-C — discard the current line, keep the session.
    Interrupted,
    /// Ctrl-D or a hard read error — leave the session.
    Eof,
}

/// Build the line editor used by the interactive session.
pub fn editor() -> rustyline::Result<Editor<NovaHelper, DefaultHistory>> {
    let config = Config::builder()
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .build();
    let mut editor = Editor::with_config(config)?;
    editor.set_helper(Some(NovaHelper));
    Ok(editor)
}

/// Read one line from the prompt.
pub fn read_input(
    editor: &mut Editor<NovaHelper, DefaultHistory>,
    prompt: &str,
) -> InputEvent {
    match editor.readline(prompt) {
        Ok(line) => InputEvent::Line(line),
        Err(ReadlineError::Interrupted) => InputEvent::Interrupted,
        Err(ReadlineError::Eof) => InputEvent::Eof,
        Err(e) => {
            eprintln!("input error: {e}");
            InputEvent::Eof
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_partial_slash_command() {
        let history = DefaultHistory::new();
        let ctx = rustyline::Context::new(&history);
        let (_, candidates) = NovaHelper.complete("/rem", 4, &ctx).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].replacement, "ember");
    }

    #[test]
    fn plain_text_gets_no_completion() {
        let history = DefaultHistory::new();
        let ctx = rustyline::Context::new(&history);
        let (_, candidates) = NovaHelper.complete("hello", 5, &ctx).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn command_list_is_slash_prefixed() {
        assert!(COMMANDS.iter().all(|c| c.starts_with('/')));
    }
}
