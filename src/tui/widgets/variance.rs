//! Variance view widget - dealer revenue in Q1/Q4 quarters as a heat table

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use rust_decimal::Decimal;

use super::chrome::{self, truncate, VISIBLE_ROWS};
use super::overview::format_amount;
use super::tabs::{Tab, TabBar};
use crate::tui::theme::{heat_level, Theme};
use crate::types::VarianceTable;

const DEALER_WIDTH: u16 = 14;
const CELL_WIDTH: u16 = 15;
const VARIANCE_WIDTH: u16 = 17;

/// Index of the first quarter column that fits, keeping the most recent ones
fn first_visible_column(quarters: usize, width: u16) -> usize {
    let room = width.saturating_sub(DEALER_WIDTH + VARIANCE_WIDTH) / CELL_WIDTH;
    quarters.saturating_sub((room as usize).max(1))
}

/// Variance view widget
pub struct VarianceView<'a> {
    table: &'a VarianceTable,
    scroll_offset: usize,
    theme: Theme,
}

impl<'a> VarianceView<'a> {
    pub fn new(table: &'a VarianceTable, scroll_offset: usize, theme: Theme) -> Self {
        Self {
            table,
            scroll_offset,
            theme,
        }
    }

    pub fn max_scroll_offset(table: &VarianceTable) -> usize {
        chrome::max_scroll_offset(table.rows.len())
    }
}

impl Widget for VarianceView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = chrome::centered(area);
        let visible_rows = self.table.rows.len().clamp(1, VISIBLE_ROWS) as u16;

        let chunks = Layout::vertical([
            Constraint::Length(1),            // Top padding
            Constraint::Length(1),            // Tabs
            Constraint::Length(1),            // Separator
            Constraint::Length(1),            // Title
            Constraint::Length(1),            // Blank
            Constraint::Length(1),            // Header
            Constraint::Length(visible_rows), // Rows
            Constraint::Min(0),               // Remaining space
            Constraint::Length(1),            // Separator
            Constraint::Length(1),            // Keybindings
        ])
        .split(area);

        TabBar::new(Tab::Variance, self.theme).render(chunks[1], buf);
        chrome::render_separator(chunks[2], buf, self.theme);
        chrome::render_title(
            chunks[3],
            buf,
            &format!(
                "Q1 vs Q4 revenue: top {} dealers by variance",
                self.table.rows.len()
            ),
            self.theme,
        );

        let first_col = first_visible_column(self.table.quarters.len(), area.width);
        let shown = (self.table.quarters.len() - first_col) as u16;
        let table_width = DEALER_WIDTH + shown * CELL_WIDTH + VARIANCE_WIDTH;
        let offset = chrome::table_offset(area.width, table_width);

        self.render_header(chunks[5], buf, first_col, offset);
        self.render_rows(chunks[6], buf, first_col, offset);
        chrome::render_separator(chunks[8], buf, self.theme);
        chrome::render_keybindings(chunks[9], buf, &[("↑↓", "Scroll")], self.theme);
    }
}

impl VarianceView<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer, first_col: usize, offset: u16) {
        let style = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);

        let mut spans = vec![Span::styled(
            format!("{:<width$}", "Dealer", width = DEALER_WIDTH as usize),
            style,
        )];
        for quarter in &self.table.quarters[first_col..] {
            spans.push(Span::styled(
                format!("{:>width$}", quarter.to_string(), width = CELL_WIDTH as usize),
                Style::default()
                    .fg(self.theme.period())
                    .add_modifier(Modifier::BOLD),
            ));
        }
        spans.push(Span::styled(
            format!("{:>width$}", "Variance", width = VARIANCE_WIDTH as usize),
            style,
        ));

        Paragraph::new(Line::from(spans)).render(
            Rect {
                x: area.x + offset,
                y: area.y,
                width: area.width.saturating_sub(offset),
                height: 1,
            },
            buf,
        );
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer, first_col: usize, offset: u16) {
        if self.table.rows.is_empty() {
            Paragraph::new(Span::styled(
                "No Q1 or Q4 contracts loaded",
                Style::default().fg(self.theme.muted()),
            ))
            .alignment(Alignment::Center)
            .render(area, buf);
            return;
        }

        let max = self.table.max_cell();

        for (i, row) in self
            .table
            .rows
            .iter()
            .skip(self.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let mut spans = vec![Span::styled(
                format!(
                    "{:<width$}",
                    truncate(&row.dealer_id, DEALER_WIDTH as usize - 1),
                    width = DEALER_WIDTH as usize
                ),
                Style::default().fg(self.theme.accent()),
            )];

            for &cell in &row.cells[first_col..] {
                let level = heat_level(cell, max);
                let text = if cell == Decimal::ZERO {
                    "-".to_string()
                } else {
                    format_amount(cell)
                };
                spans.push(Span::styled(
                    format!("{:>width$}", text, width = CELL_WIDTH as usize),
                    Style::default()
                        .fg(self.theme.heat_text(level))
                        .bg(self.theme.heat_color(level)),
                ));
            }

            spans.push(Span::styled(
                format!(
                    "{:>width$}",
                    format_amount(row.variance),
                    width = VARIANCE_WIDTH as usize
                ),
                Style::default()
                    .fg(self.theme.revenue())
                    .add_modifier(Modifier::BOLD),
            ));

            Paragraph::new(Line::from(spans)).render(
                Rect {
                    x: area.x + offset,
                    y: area.y + i as u16,
                    width: area.width.saturating_sub(offset),
                    height: 1,
                },
                buf,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Quarter, VarianceRow};

    fn make_table() -> VarianceTable {
        VarianceTable {
            quarters: vec![
                Quarter {
                    year: 2023,
                    quarter: 4,
                },
                Quarter {
                    year: 2024,
                    quarter: 1,
                },
            ],
            rows: vec![VarianceRow {
                dealer_id: "D042".into(),
                cells: vec![Decimal::from(1000), Decimal::ZERO],
                variance: Decimal::from(1000),
            }],
        }
    }

    fn screen(buf: &Buffer, area: Rect) -> String {
        (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_first_visible_column_fits_all() {
        assert_eq!(first_visible_column(2, 170), 0);
    }

    #[test]
    fn test_first_visible_column_keeps_recent() {
        // 60 - 31 = 29 → one 15-wide column fits
        assert_eq!(first_visible_column(4, 60), 3);
        // Always at least one column
        assert_eq!(first_visible_column(4, 10), 3);
        assert_eq!(first_visible_column(0, 10), 0);
    }

    #[test]
    fn test_variance_view_renders_cells() {
        let table = make_table();
        let area = Rect::new(0, 0, 120, 30);
        let mut buf = Buffer::empty(area);
        VarianceView::new(&table, 0, Theme::Dark).render(area, &mut buf);

        let text = screen(&buf, area);
        assert!(text.contains("2023Q4"));
        assert!(text.contains("2024Q1"));
        assert!(text.contains("D042"));
        assert!(text.contains("€1,000.00"));
    }

    #[test]
    fn test_variance_view_empty() {
        let table = VarianceTable::default();
        let area = Rect::new(0, 0, 100, 20);
        let mut buf = Buffer::empty(area);
        VarianceView::new(&table, 0, Theme::Light).render(area, &mut buf);
        assert!(screen(&buf, area).contains("No Q1 or Q4 contracts"));
    }

    #[test]
    fn test_variance_scroll_bounds() {
        let mut table = make_table();
        let row = table.rows[0].clone();
        table.rows = vec![row; VISIBLE_ROWS + 4];
        assert_eq!(VarianceView::max_scroll_offset(&table), 4);
    }
}
