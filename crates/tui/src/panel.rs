//! Box-drawing panels.

use crossterm::style::{Color, SetForegroundColor, ResetColor};

const MAX_WIDTH: usize = 96;

/// Print a bordered panel with an optional title in the top border.
pub fn panel(title: Option<&str>, text: &str, color: Color) {
    let lines = wrap(text, MAX_WIDTH);
    let content_width = lines
        .iter()
        .map(|l| l.chars().count())
        .chain(title.map(|t| t.chars().count() + 2))
        .max()
        .unwrap_or(0)
        .min(MAX_WIDTH);

    let top = match title {
        Some(t) => {
            let t_len = t.chars().count() + 2;
            let fill = content_width.saturating_sub(t_len) + 2;
            format!("╭─ {t} {}╮", "─".repeat(fill))
        }
        None => format!("╭{}╮", "─".repeat(content_width + 2)),
    };
    let bottom = format!("╰{}╯", "─".repeat(content_width + 2));

    println!("{}{top}{}", SetForegroundColor(color), ResetColor);
    for line in &lines {
        let pad = content_width.saturating_sub(line.chars().count());
        println!(
            "{}│{} {line}{} {}│{}",
            SetForegroundColor(color),
            ResetColor,
            " ".repeat(pad),
            SetForegroundColor(color),
            ResetColor
        );
    }
    println!("{}{bottom}{}", SetForegroundColor(color), ResetColor);
}

/// Wrap text to a maximum width, preserving existing line breaks.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.lines() {
        if line.chars().count() <= width {
            out.push(line.to_string());
            continue;
        }
        let mut current = String::new();
        for word in line.split(' ') {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}
