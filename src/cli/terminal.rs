//! Terminal capability detection and styling

use owo_colors::{colors::css, OwoColorize};

/// Columns assumed when the terminal width cannot be detected.
const FALLBACK_WIDTH: usize = 80;

/// Whether stdout is a terminal that understands colour.
fn color_enabled() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// The width of the terminal in columns.
pub fn width() -> usize {
    terminal_size::terminal_size().map_or(FALLBACK_WIDTH, |(w, _)| usize::from(w.0))
}

/// Shortens `text` to at most `width` characters, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// How a piece of output should be emphasised.
#[derive(Debug, Clone, Copy)]
pub enum Tone {
    /// Something went through.
    Ok,
    /// Something needs the reader's attention.
    Warn,
    /// Secondary detail.
    Faint,
}

/// Applies `tone` to `text` when the terminal supports colour.
pub fn paint(text: impl AsRef<str>, tone: Tone) -> String {
    let text = text.as_ref();
    if !color_enabled() {
        return text.to_string();
    }
    match tone {
        Tone::Ok => text.fg::<css::Green>().to_string(),
        Tone::Warn => text.fg::<css::Orange>().to_string(),
        Tone::Faint => text.dimmed().to_string(),
    }
}
