use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::styling::HINT;

/// Get terminal width, defaulting to 80 if detection fails
pub fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(80)
}

/// Cut `text` so it fits in `max_width` columns, ending with `...` when cut.
///
/// Unlike word-boundary truncation this cuts mid-word: commit subjects are
/// read left to right and every character of room counts.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    let target_width = max_width.saturating_sub(3);
    let mut current_width = 0;
    let mut end = 0;
    for (idx, ch) in text.char_indices() {
        let char_width = ch.width().unwrap_or(0);
        if current_width + char_width > target_width {
            break;
        }
        current_width += char_width;
        end = idx + ch.len_utf8();
    }

    format!("{}...", &text[..end])
}

/// Dim rule spanning `width` columns
pub fn horizontal_line(width: usize) -> String {
    format!("{HINT}{}{HINT:#}", "─".repeat(width))
}
