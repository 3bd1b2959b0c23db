//! Trends view widget - monthly revenue with sparklines under the active filter

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::chrome::{self, VISIBLE_ROWS};
use super::overview::{format_amount, format_number};
use super::tabs::{Tab, TabBar};
use crate::services::{Aggregator, RecordFilter};
use crate::tui::theme::Theme;
use crate::types::{sum_amounts, ContractRecord, TrendPoint};

/// Format a sparkline bar based on the value / max ratio
/// Example: value=500, max=1000, width=8 → "▓▓▓▓░░░░"
pub fn format_sparkline(value: Decimal, max: Decimal, width: usize) -> String {
    if max <= Decimal::ZERO || width == 0 {
        return "░".repeat(width);
    }
    let ratio = (value / max).to_f64().unwrap_or(0.0).max(0.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("{}{}", "▓".repeat(filled), "░".repeat(width - filled))
}

/// Month-over-month change, `None` when the previous month had no revenue
pub fn month_over_month(current: Decimal, previous: Decimal) -> Option<f64> {
    if previous <= Decimal::ZERO {
        return None;
    }
    (current - previous)
        .checked_div(previous)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_f64()
}

/// Monthly revenue series for the current filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendsData {
    /// Chronological
    pub points: Vec<TrendPoint>,
    pub max_revenue: Decimal,
    pub total_revenue: Decimal,
    pub contract_count: usize,
}

impl TrendsData {
    pub fn from_records(records: &[&ContractRecord]) -> Self {
        let points = Aggregator::monthly_trend(records.iter().copied());
        let max_revenue = points
            .iter()
            .map(|p| p.revenue)
            .max()
            .unwrap_or(Decimal::ZERO);
        let total_revenue = sum_amounts(points.iter().map(|p| p.revenue));
        Self {
            points,
            max_revenue,
            total_revenue,
            contract_count: records.len(),
        }
    }
}

/// Month(12) + Revenue(22) + Change(12) + Trend(28)
const TABLE_WIDTH: u16 = 74;
const SPARKLINE_WIDTH: usize = 24;

/// Trends view widget
pub struct TrendsView<'a> {
    data: &'a TrendsData,
    filter: &'a RecordFilter,
    scroll_offset: usize,
    theme: Theme,
}

impl<'a> TrendsView<'a> {
    pub fn new(
        data: &'a TrendsData,
        filter: &'a RecordFilter,
        scroll_offset: usize,
        theme: Theme,
    ) -> Self {
        Self {
            data,
            filter,
            scroll_offset,
            theme,
        }
    }

    pub fn max_scroll_offset(data: &TrendsData) -> usize {
        chrome::max_scroll_offset(data.points.len())
    }
}

impl Widget for TrendsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = chrome::centered(area);
        let visible_rows = self.data.points.len().clamp(1, VISIBLE_ROWS) as u16;

        let chunks = Layout::vertical([
            Constraint::Length(1),            // Top padding
            Constraint::Length(1),            // Tabs
            Constraint::Length(1),            // Separator
            Constraint::Length(1),            // Filter line
            Constraint::Length(1),            // Totals line
            Constraint::Length(1),            // Header
            Constraint::Length(visible_rows), // Rows
            Constraint::Min(0),               // Remaining space
            Constraint::Length(1),            // Separator
            Constraint::Length(1),            // Keybindings
        ])
        .split(area);

        TabBar::new(Tab::Trends, self.theme).render(chunks[1], buf);
        chrome::render_separator(chunks[2], buf, self.theme);
        self.render_filter(chunks[3], buf);
        self.render_totals(chunks[4], buf);
        self.render_header(chunks[5], buf);
        self.render_rows(chunks[6], buf);
        chrome::render_separator(chunks[8], buf, self.theme);
        chrome::render_keybindings(
            chunks[9],
            buf,
            &[("f", "Fuel"), ("m", "Model"), ("↑↓", "Scroll")],
            self.theme,
        );
    }
}

impl TrendsView<'_> {
    fn render_filter(&self, area: Rect, buf: &mut Buffer) {
        let label = |values: &[String]| {
            if values.is_empty() {
                "all".to_string()
            } else {
                values.join(", ")
            }
        };
        let bound = |d: Option<chrono::NaiveDate>| {
            d.map(|d| d.to_string()).unwrap_or_else(|| "…".to_string())
        };

        let value_style = Style::default().fg(self.theme.warning());
        let key_style = Style::default().fg(self.theme.muted());
        let line = Line::from(vec![
            Span::styled("Dates ", key_style),
            Span::styled(
                format!("{} → {}", bound(self.filter.from), bound(self.filter.to)),
                value_style,
            ),
            Span::styled("   Fuel ", key_style),
            Span::styled(label(&self.filter.fuel_types), value_style),
            Span::styled("   Model ", key_style),
            Span::styled(label(&self.filter.models), value_style),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_totals(&self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(
                format_amount(self.data.total_revenue),
                Style::default()
                    .fg(self.theme.revenue())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    " across {} contracts",
                    format_number(self.data.contract_count as u64)
                ),
                Style::default().fg(self.theme.muted()),
            ),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let offset = chrome::table_offset(area.width, TABLE_WIDTH);
        let style = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);
        let header = Line::from(vec![
            Span::styled(format!("{:<12}", "Month"), style),
            Span::styled(format!("{:>22}", "Revenue"), style),
            Span::styled(format!("{:>12}", "MoM"), style),
            Span::styled(format!("{:>28}", "Trend"), style),
        ]);
        Paragraph::new(header).render(
            Rect {
                x: area.x + offset,
                y: area.y,
                width: TABLE_WIDTH.min(area.width),
                height: 1,
            },
            buf,
        );
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        if self.data.points.is_empty() {
            Paragraph::new(Span::styled(
                "No contracts match the current filter",
                Style::default().fg(self.theme.muted()),
            ))
            .alignment(Alignment::Center)
            .render(area, buf);
            return;
        }

        let offset = chrome::table_offset(area.width, TABLE_WIDTH);

        for (row, (i, point)) in self
            .data
            .points
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let change = i
                .checked_sub(1)
                .and_then(|prev| month_over_month(point.revenue, self.data.points[prev].revenue));
            let (change_text, change_color) = match change {
                Some(pct) if pct < 0.0 => (format!("{:+.1}%", pct), self.theme.error()),
                Some(pct) => (format!("{:+.1}%", pct), self.theme.bar()),
                None => ("-".to_string(), self.theme.muted()),
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("{:<12}", point.month.to_string()),
                    Style::default().fg(self.theme.period()),
                ),
                Span::styled(
                    format!("{:>22}", format_amount(point.revenue)),
                    Style::default().fg(self.theme.revenue()),
                ),
                Span::styled(
                    format!("{:>12}", change_text),
                    Style::default().fg(change_color),
                ),
                Span::raw("    "),
                Span::styled(
                    format_sparkline(point.revenue, self.data.max_revenue, SPARKLINE_WIDTH),
                    Style::default().fg(self.theme.bar()),
                ),
            ]);

            Paragraph::new(line).render(
                Rect {
                    x: area.x + offset,
                    y: area.y + row as u16,
                    width: TABLE_WIDTH.min(area.width),
                    height: 1,
                },
                buf,
            );
        }
    }
}
