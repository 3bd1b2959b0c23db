//! Models view widget - revenue per car model and fuel type

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::chrome::{self, truncate, VISIBLE_ROWS};
use super::overview::format_amount;
use super::tabs::{Tab, TabBar};
use crate::tui::theme::Theme;
use crate::types::{sum_amounts, ModelFuelRow};

/// Format a percentage bar with filled/empty blocks
/// Example: 50.0% with width 10 → "█████░░░░░"
pub fn format_percentage_bar(percent: f64, width: usize) -> String {
    let filled = (((percent / 100.0) * width as f64).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Share of `part` in `total`, as a percentage
pub fn percent_of(part: Decimal, total: Decimal) -> f64 {
    if total <= Decimal::ZERO {
        return 0.0;
    }
    (part / total * Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or(0.0)
}

/// Data for the models view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelsData {
    /// Sorted by revenue descending
    pub rows: Vec<ModelFuelRow>,
    pub total_revenue: Decimal,
}

impl ModelsData {
    /// Build from `Aggregator::model_fuel_breakdown` output
    pub fn from_breakdown(mut rows: Vec<ModelFuelRow>) -> Self {
        let total_revenue = sum_amounts(rows.iter().map(|r| r.revenue));
        rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        Self {
            rows,
            total_revenue,
        }
    }
}

/// Model(30) + Fuel(10) + Revenue(20) + Share(8) + Bar(18)
const TABLE_WIDTH: u16 = 86;

/// Models view widget
pub struct ModelsView<'a> {
    data: &'a ModelsData,
    scroll_offset: usize,
    theme: Theme,
}

impl<'a> ModelsView<'a> {
    pub fn new(data: &'a ModelsData, scroll_offset: usize, theme: Theme) -> Self {
        Self {
            data,
            scroll_offset,
            theme,
        }
    }

    pub fn max_scroll_offset(data: &ModelsData) -> usize {
        chrome::max_scroll_offset(data.rows.len())
    }
}

impl Widget for ModelsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = chrome::centered(area);
        let visible_rows = self.data.rows.len().clamp(1, VISIBLE_ROWS) as u16;

        let chunks = Layout::vertical([
            Constraint::Length(1),            // Top padding
            Constraint::Length(1),            // Tabs
            Constraint::Length(1),            // Separator
            Constraint::Length(1),            // Header
            Constraint::Length(visible_rows), // Model rows
            Constraint::Min(0),               // Remaining space
            Constraint::Length(1),            // Separator
            Constraint::Length(1),            // Keybindings
        ])
        .split(area);

        TabBar::new(Tab::Models, self.theme).render(chunks[1], buf);
        chrome::render_separator(chunks[2], buf, self.theme);
        self.render_header(chunks[3], buf);
        self.render_models(chunks[4], buf);
        chrome::render_separator(chunks[6], buf, self.theme);
        chrome::render_keybindings(chunks[7], buf, &[("↑↓", "Scroll")], self.theme);
    }
}

impl ModelsView<'_> {
    fn table_rect(&self, area: Rect, y: u16) -> Rect {
        Rect {
            x: area.x + chrome::table_offset(area.width, TABLE_WIDTH),
            y,
            width: TABLE_WIDTH.min(area.width),
            height: 1,
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);
        let header = Line::from(vec![
            Span::styled(format!("{:<30}", "Model"), style),
            Span::styled(format!("{:<10}", "Fuel"), style),
            Span::styled(format!("{:>20}", "Revenue"), style),
            Span::styled(format!("{:>8}", "Share"), style),
            Span::styled(format!("{:>18}", ""), style),
        ]);
        Paragraph::new(header).render(self.table_rect(area, area.y), buf);
    }

    fn render_models(&self, area: Rect, buf: &mut Buffer) {
        if self.data.rows.is_empty() {
            Paragraph::new(Span::styled(
                "No contracts loaded",
                Style::default().fg(self.theme.muted()),
            ))
            .alignment(Alignment::Center)
            .render(area, buf);
            return;
        }

        for (i, row) in self
            .data
            .rows
            .iter()
            .skip(self.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let percent = percent_of(row.revenue, self.data.total_revenue);

            let line = Line::from(vec![
                Span::styled(
                    format!("{:<30}", truncate(&row.model, 28)),
                    Style::default().fg(self.theme.accent()),
                ),
                Span::styled(
                    format!("{:<10}", truncate(&row.fuel_type, 9)),
                    Style::default().fg(self.theme.period()),
                ),
                Span::styled(
                    format!("{:>20}", format_amount(row.revenue)),
                    Style::default().fg(self.theme.revenue()),
                ),
                Span::styled(
                    format!("{:>7.1}%", percent),
                    Style::default().fg(self.theme.text()),
                ),
                Span::raw("  "),
                Span::styled(
                    format_percentage_bar(percent, 16),
                    Style::default().fg(self.theme.bar()),
                ),
            ]);

            Paragraph::new(line).render(self.table_rect(area, area.y + i as u16), buf);
        }
    }
}
