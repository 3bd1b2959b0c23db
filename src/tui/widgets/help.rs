//! Help popup widget - displays keyboard shortcuts

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

const POPUP_WIDTH: u16 = 46;
const POPUP_HEIGHT: u16 = 18;

const NAVIGATION: &[(&str, &str)] = &[
    ("Tab / Shift+Tab", "Switch view"),
    ("1-6", "Jump to view"),
    ("Up/Down or j/k", "Scroll tables"),
];

const TRENDS: &[(&str, &str)] = &[("f", "Cycle fuel filter"), ("m", "Cycle model filter")];

const GENERAL: &[(&str, &str)] = &[("q / Esc", "Quit"), ("?", "Toggle help")];

/// Help popup widget showing keyboard shortcuts
pub struct HelpPopup {
    theme: Theme,
}

impl HelpPopup {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Calculate centered popup area
    pub fn centered_area(area: Rect) -> Rect {
        let x = area.x + (area.width.saturating_sub(POPUP_WIDTH)) / 2;
        let y = area.y + (area.height.saturating_sub(POPUP_HEIGHT)) / 2;
        Rect {
            x,
            y,
            width: POPUP_WIDTH.min(area.width),
            height: POPUP_HEIGHT.min(area.height),
        }
    }

    /// Section header, separator, then one line per binding
    fn render_section(
        &self,
        rows: &[Rect],
        buf: &mut Buffer,
        title: &str,
        bindings: &[(&str, &str)],
    ) {
        let Some((header, rest)) = rows.split_first() else {
            return;
        };
        Paragraph::new(Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(self.theme.period())
                .add_modifier(Modifier::BOLD),
        )))
        .render(*header, buf);

        if let Some(sep) = rest.first() {
            let line = "─".repeat(sep.width as usize);
            buf.set_string(sep.x, sep.y, &line, Style::default().fg(self.theme.muted()));
        }

        for (area, (key, desc)) in rest.iter().skip(1).zip(bindings) {
            render_keybinding(*area, buf, key, desc, self.theme);
        }
    }
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Widget for HelpPopup {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Overlay
        Clear.render(area, buf);

        let title = format!(" dealerdash v{} ", VERSION);
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));

        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::vertical([Constraint::Length(1); 16]).split(inner);

        // Each section: header + separator + bindings; blank rows between sections
        let nav_end = 2 + NAVIGATION.len();
        let trends_start = nav_end + 1;
        let trends_end = trends_start + 2 + TRENDS.len();
        let general_start = trends_end + 1;
        let general_end = general_start + 2 + GENERAL.len();

        self.render_section(&rows[..nav_end], buf, "Navigation", NAVIGATION);
        self.render_section(&rows[trends_start..trends_end], buf, "Trends", TRENDS);
        self.render_section(&rows[general_start..general_end], buf, "General", GENERAL);

        if let Some(hint_area) = rows.get(general_end) {
            Paragraph::new(Span::styled(
                "Press ? to close",
                Style::default().fg(self.theme.muted()),
            ))
            .alignment(Alignment::Center)
            .render(*hint_area, buf);
        }
    }
}

/// Render a single keybinding line
fn render_keybinding(area: Rect, buf: &mut Buffer, key: &str, desc: &str, theme: Theme) {
    let line = Line::from(vec![
        Span::styled(
            format!("  {:<18}", key),
            Style::default().fg(theme.accent()),
        ),
        Span::styled(desc.to_string(), Style::default().fg(theme.text())),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Left)
        .render(area, buf);
}
