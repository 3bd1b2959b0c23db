//! Revenue view widget - dealers ranked by revenue

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use rust_decimal::Decimal;

use super::chrome::{self, truncate, VISIBLE_ROWS};
use super::models::{format_percentage_bar, percent_of};
use super::overview::{format_amount, format_number};
use super::tabs::{Tab, TabBar};
use crate::tui::theme::Theme;
use crate::types::{sum_amounts, GroupSummary};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevenueData {
    /// From `Aggregator::revenue_by_dealer`, already ranked
    pub dealers: Vec<GroupSummary>,
    pub total_revenue: Decimal,
}

impl RevenueData {
    pub fn new(dealers: Vec<GroupSummary>) -> Self {
        let total_revenue = sum_amounts(dealers.iter().map(|d| d.kpi.total_capital));
        Self {
            dealers,
            total_revenue,
        }
    }
}

/// Rank(6) + Dealer(18) + Contracts(11) + Active(9) + Revenue(20) + Bar(18)
const TABLE_WIDTH: u16 = 82;

pub struct RevenueView<'a> {
    data: &'a RevenueData,
    scroll_offset: usize,
    theme: Theme,
}

impl<'a> RevenueView<'a> {
    pub fn new(data: &'a RevenueData, scroll_offset: usize, theme: Theme) -> Self {
        Self {
            data,
            scroll_offset,
            theme,
        }
    }

    pub fn max_scroll_offset(data: &RevenueData) -> usize {
        chrome::max_scroll_offset(data.dealers.len())
    }
}

impl Widget for RevenueView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = chrome::centered(area);
        let visible_rows = self.data.dealers.len().clamp(1, VISIBLE_ROWS) as u16;

        let chunks = Layout::vertical([
            Constraint::Length(1),            // Top padding
            Constraint::Length(1),            // Tabs
            Constraint::Length(1),            // Separator
            Constraint::Length(1),            // Header
            Constraint::Length(visible_rows), // Dealer rows
            Constraint::Min(0),               // Remaining space
            Constraint::Length(1),            // Separator
            Constraint::Length(1),            // Keybindings
        ])
        .split(area);

        TabBar::new(Tab::Revenue, self.theme).render(chunks[1], buf);
        chrome::render_separator(chunks[2], buf, self.theme);
        self.render_header(chunks[3], buf);
        self.render_dealers(chunks[4], buf);
        chrome::render_separator(chunks[6], buf, self.theme);
        chrome::render_keybindings(chunks[7], buf, &[("↑↓", "Scroll")], self.theme);
    }
}

impl RevenueView<'_> {
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
            Span::styled(format!("{:>4}  ", "#"), style),
            Span::styled(format!("{:<18}", "Dealer"), style),
            Span::styled(format!("{:>11}", "Contracts"), style),
            Span::styled(format!("{:>9}", "Active"), style),
            Span::styled(format!("{:>20}", "Revenue"), style),
            Span::styled(format!("{:>18}", "Share"), style),
        ]);
        Paragraph::new(header).render(self.table_rect(area, area.y), buf);
    }

    fn render_dealers(&self, area: Rect, buf: &mut Buffer) {
        if self.data.dealers.is_empty() {
            Paragraph::new(Span::styled(
                "No contracts loaded",
                Style::default().fg(self.theme.muted()),
            ))
            .alignment(Alignment::Center)
            .render(area, buf);
            return;
        }

        for (row, (rank, dealer)) in self
            .data
            .dealers
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let percent = percent_of(dealer.kpi.total_capital, self.data.total_revenue);

            let line = Line::from(vec![
                Span::styled(
                    format!("{:>4}  ", rank + 1),
                    Style::default().fg(self.theme.muted()),
                ),
                Span::styled(
                    format!("{:<18}", truncate(&dealer.key, 17)),
                    Style::default().fg(self.theme.accent()),
                ),
                Span::styled(
                    format!("{:>11}", format_number(dealer.kpi.count)),
                    Style::default().fg(self.theme.text()),
                ),
                Span::styled(
                    format!("{:>9}", format_number(dealer.kpi.active_count)),
                    Style::default().fg(self.theme.bar()),
                ),
                Span::styled(
                    format!("{:>20}", format_amount(dealer.kpi.total_capital)),
                    Style::default().fg(self.theme.revenue()),
                ),
                Span::raw("  "),
                Span::styled(
                    format_percentage_bar(percent, 16),
                    Style::default().fg(self.theme.bar()),
                ),
            ]);

            Paragraph::new(line).render(self.table_rect(area, area.y + row as u16), buf);
        }
    }
}
