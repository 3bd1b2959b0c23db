//! Shared view chrome: centering, separators, titles, keybinding hints

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Keeps tables readable on wide terminals
pub const MAX_CONTENT_WIDTH: u16 = 170;

/// Rows shown at once by scrollable tables
pub const VISIBLE_ROWS: usize = 15;

/// Center a column of at most `MAX_CONTENT_WIDTH` inside `area`
pub fn centered(area: Rect) -> Rect {
    let width = area.width.min(MAX_CONTENT_WIDTH);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y,
        width,
        height: area.height,
    }
}

/// Horizontal offset that centers a table of `table_width` in `area_width`
pub fn table_offset(area_width: u16, table_width: u16) -> u16 {
    area_width.saturating_sub(table_width) / 2
}

/// Largest scroll offset for `count` rows
pub fn max_scroll_offset(count: usize) -> usize {
    count.saturating_sub(VISIBLE_ROWS)
}

pub fn render_separator(area: Rect, buf: &mut Buffer, theme: Theme) {
    let line = "─".repeat(area.width as usize);
    buf.set_string(area.x, area.y, &line, Style::default().fg(theme.muted()));
}

pub fn render_title(area: Rect, buf: &mut Buffer, title: &str, theme: Theme) {
    Paragraph::new(Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(theme.text())
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .render(area, buf);
}

/// Footer hints: view-specific bindings first, then the common ones
pub fn render_keybindings(area: Rect, buf: &mut Buffer, extra: &[(&str, &str)], theme: Theme) {
    let common = [("q", "Quit"), ("Tab", "Switch view"), ("?", "Help")];

    let mut spans = Vec::new();
    for (i, (key, desc)) in extra.iter().chain(common.iter()).enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(theme.accent()),
        ));
        spans.push(Span::styled(
            format!(": {}", desc),
            Style::default().fg(theme.muted()),
        ));
    }

    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .render(area, buf);
}

/// Truncate to `max` characters with an ellipsis (UTF-8 safe)
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let keep = max.saturating_sub(1);
        format!("{}…", text.chars().take(keep).collect::<String>())
    } else {
        text.to_string()
    }
}
