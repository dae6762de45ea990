use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Clip text to `width` characters, replacing the tail with an ellipsis when
/// it does not fit. Used for the one-line description previews in the list.
pub(crate) fn clip_text(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= width {
        return text.to_string();
    }
    if width == 1 {
        return "…".to_string();
    }
    let mut clipped: String = chars[..width - 1].iter().collect();
    clipped.push('…');
    clipped
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn clip_text_passes_short_strings_through() {
        assert_eq!(clip_text("Dune", 10), "Dune");
        assert_eq!(clip_text("Dune", 4), "Dune");
    }

    #[test]
    fn clip_text_appends_ellipsis_when_too_long() {
        assert_eq!(clip_text("A desert planet saga", 9), "A desert…");
        assert_eq!(clip_text("abc", 1), "…");
        assert_eq!(clip_text("anything", 0), "");
    }

    #[test]
    fn surface_error_prefers_the_root_cause() {
        let err = anyhow!("Book not found")
            .context("failed to update book")
            .context("submit failed");
        assert_eq!(surface_error(&err), "Book not found");
    }
}
