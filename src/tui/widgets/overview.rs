//! Overview widget - fiscal KPI cards and load summary

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use rust_decimal::Decimal;

use super::chrome::{self, truncate};
use super::tabs::{Tab, TabBar};
use crate::services::data_loader::SourceReport;
use crate::tui::theme::Theme;
use crate::types::FiscalKpis;

/// Insert thousands separators into a run of ASCII digits
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, ch) in digits.bytes().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(ch as char);
    }
    result
}

/// Format a count with thousand separators (e.g., 1234567 -> "1,234,567")
pub fn format_number(n: u64) -> String {
    group_thousands(&n.to_string())
}

/// Format a euro amount to cents (e.g., 1234567.891 -> "€1,234,567.89")
pub fn format_amount(amount: Decimal) -> String {
    let text = format!("{:.2}", amount.round_dp(2));
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac) = digits.split_once('.').unwrap_or((digits, "00"));
    format!("{}€{}.{}", sign, group_thousands(int_part), frac)
}

/// Data for the overview display
#[derive(Debug)]
pub struct OverviewData<'a> {
    pub kpis: &'a FiscalKpis,
    pub sources: &'a [SourceReport],
}

/// Card dimensions
const CARD_WIDTH: u16 = 30;
const CARD_HEIGHT: u16 = 5;

/// Balanced 2x3 grid at most
const MAX_COLS: usize = 3;
const CARD_COUNT: usize = 6;

/// Cards per row for the available width
fn cards_per_row(width: u16) -> usize {
    let usable_width = width.saturating_sub(4);
    let cards = (usable_width / (CARD_WIDTH + 2)) as usize;
    cards.clamp(1, MAX_COLS)
}

/// Overview widget
pub struct Overview<'a> {
    data: OverviewData<'a>,
    theme: Theme,
}

impl<'a> Overview<'a> {
    pub fn new(data: OverviewData<'a>, theme: Theme) -> Self {
        Self { data, theme }
    }
}

impl Widget for Overview<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = chrome::centered(area);

        let cols = cards_per_row(area.width);
        let rows = CARD_COUNT.div_ceil(cols);
        let grid_height = (rows as u16) * (CARD_HEIGHT + 1);
        let source_rows = self.data.sources.len() as u16;

        let chunks = Layout::vertical([
            Constraint::Length(1),           // Top padding
            Constraint::Length(1),           // Tabs
            Constraint::Length(1),           // Separator
            Constraint::Length(1),           // Title
            Constraint::Length(1),           // Blank
            Constraint::Length(grid_height), // Card grid
            Constraint::Length(1),           // Sources header
            Constraint::Length(source_rows), // Per-source rows
            Constraint::Min(0),              // Remaining space
            Constraint::Length(1),           // Separator
            Constraint::Length(1),           // Keybindings
        ])
        .split(area);

        TabBar::new(Tab::Overview, self.theme).render(chunks[1], buf);
        chrome::render_separator(chunks[2], buf, self.theme);
        chrome::render_title(chunks[3], buf, "Fiscal KPIs", self.theme);
        self.render_card_grid(chunks[5], buf, cols);
        self.render_sources(chunks[6], chunks[7], buf);
        chrome::render_separator(chunks[9], buf, self.theme);
        chrome::render_keybindings(chunks[10], buf, &[("1-6", "Jump")], self.theme);
    }
}

impl Overview<'_> {
    fn render_card_grid(&self, area: Rect, buf: &mut Buffer, cols: usize) {
        let cards = self.build_cards();

        let total_cards_width = (cols as u16) * CARD_WIDTH + ((cols - 1) as u16) * 2;
        let start_x = area.x + (area.width.saturating_sub(total_cards_width)) / 2;

        for (i, card) in cards.iter().enumerate() {
            let row = i / cols;
            let col = i % cols;

            let card_x = start_x + (col as u16) * (CARD_WIDTH + 2);
            let card_y = area.y + (row as u16) * (CARD_HEIGHT + 1);

            if card_y + CARD_HEIGHT > area.y + area.height {
                continue;
            }

            let card_area = Rect {
                x: card_x,
                y: card_y,
                width: CARD_WIDTH.min(area.width),
                height: CARD_HEIGHT,
            };
            self.render_card(card_area, buf, card);
        }
    }

    fn build_cards(&self) -> Vec<KpiCard> {
        let kpis = self.data.kpis;
        let top_dealer = kpis
            .top_dealer
            .as_ref()
            .map(|d| format!("{} {}", d.dealer_id, format_amount(d.revenue)))
            .unwrap_or_else(|| "N/A".to_string());

        vec![
            KpiCard {
                title: "Total Revenue",
                value: format_amount(kpis.total_revenue),
                color: self.theme.accent(),
            },
            KpiCard {
                title: "Avg Revenue / Dealer",
                value: format_amount(kpis.avg_revenue_per_dealer),
                color: self.theme.stat_blue(),
            },
            KpiCard {
                title: "Top Dealer",
                value: top_dealer,
                color: self.theme.stat_warm(),
            },
            KpiCard {
                title: "Active Contracts",
                value: format_number(kpis.active_contracts),
                color: self.theme.bar(),
            },
            KpiCard {
                title: "Contracts",
                value: format_number(kpis.contract_count),
                color: self.theme.period(),
            },
            KpiCard {
                title: "Dealers",
                value: format_number(kpis.dealer_count),
                color: self.theme.revenue(),
            },
        ]
    }

    fn render_card(&self, area: Rect, buf: &mut Buffer, card: &KpiCard) {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(card.color))
            .render(area, buf);

        let inner_width = area.width.saturating_sub(2) as usize;

        if area.height > 2 {
            let title = truncate(card.title, inner_width);
            let x = area.x + (area.width.saturating_sub(title.chars().count() as u16)) / 2;
            buf.set_string(x, area.y + 1, &title, Style::default().fg(card.color));
        }

        if area.height > 3 {
            let value = truncate(&card.value, inner_width);
            let x = area.x + (area.width.saturating_sub(value.chars().count() as u16)) / 2;
            buf.set_string(
                x,
                area.y + 3,
                &value,
                Style::default()
                    .fg(self.theme.text())
                    .add_modifier(Modifier::BOLD),
            );
        }
    }

    fn render_sources(&self, header: Rect, rows: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::from(Span::styled(
            "Sources",
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(header, buf);

        for (i, source) in self.data.sources.iter().enumerate() {
            let y = rows.y + i as u16;
            if y >= rows.y + rows.height {
                break;
            }

            let skipped_color = if source.skipped > 0 {
                self.theme.error()
            } else {
                self.theme.muted()
            };
            let flagged_color = if source.flagged > 0 {
                self.theme.warning()
            } else {
                self.theme.muted()
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("{:<4}", source.country.code()),
                    Style::default().fg(self.theme.accent()),
                ),
                Span::styled(
                    format!("{:>10} kept", format_number(source.kept as u64)),
                    Style::default().fg(self.theme.text()),
                ),
                Span::styled(
                    format!("{:>8} skipped", format_number(source.skipped as u64)),
                    Style::default().fg(skipped_color),
                ),
                Span::styled(
                    format!("{:>8} flagged", format_number(source.flagged as u64)),
                    Style::default().fg(flagged_color),
                ),
            ]);
            Paragraph::new(line).alignment(Alignment::Center).render(
                Rect {
                    x: rows.x,
                    y,
                    width: rows.width,
                    height: 1,
                },
                buf,
            );
        }
    }
}

/// Internal card representation
struct KpiCard {
    title: &'static str,
    value: String,
    color: Color,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Country, DealerRevenue};

    // ========== format_number tests ==========

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    // ========== format_amount tests ==========

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::ZERO), "€0.00");
        assert_eq!(format_amount(Decimal::new(123456789, 2)), "€1,234,567.89");
        assert_eq!(format_amount(Decimal::from(1000)), "€1,000.00");
    }

    #[test]
    fn test_format_amount_rounds_to_cents() {
        assert_eq!(format_amount(Decimal::new(10005, 3)), "€10.00");
        assert_eq!(format_amount(Decimal::new(12346, 3)), "€12.35");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(Decimal::new(-150000, 2)), "-€1,500.00");
    }

    // ========== card grid tests ==========

    #[test]
    fn test_overview_builds_six_cards() {
        let kpis = FiscalKpis {
            total_revenue: Decimal::from(450),
            dealer_count: 2,
            avg_revenue_per_dealer: Decimal::from(225),
            top_dealer: Some(DealerRevenue {
                dealer_id: "D001".into(),
                revenue: Decimal::from(300),
            }),
            active_contracts: 2,
            contract_count: 3,
        };
        let view = Overview::new(
            OverviewData {
                kpis: &kpis,
                sources: &[],
            },
            Theme::Dark,
        );
        let cards = view.build_cards();

        assert_eq!(cards.len(), CARD_COUNT);
        assert_eq!(cards[0].value, "€450.00");
        assert_eq!(cards[2].value, "D001 €300.00");
    }

    #[test]
    fn test_overview_empty_top_dealer() {
        let kpis = FiscalKpis::default();
        let view = Overview::new(
            OverviewData {
                kpis: &kpis,
                sources: &[],
            },
            Theme::Dark,
        );
        assert_eq!(view.build_cards()[2].value, "N/A");
    }

    #[test]
    fn test_cards_per_row() {
        assert_eq!(cards_per_row(10), 1);
        assert!((1..=2).contains(&cards_per_row(70)));
        assert_eq!(cards_per_row(170), MAX_COLS);
    }

    #[test]
    fn test_overview_renders_sources() {
        let kpis = FiscalKpis::default();
        let sources = [SourceReport {
            country: Country::Italy,
            kept: 1200,
            skipped: 3,
            flagged: 0,
        }];
        let area = Rect::new(0, 0, 120, 40);
        let mut buf = Buffer::empty(area);
        Overview::new(
            OverviewData {
                kpis: &kpis,
                sources: &sources,
            },
            Theme::Dark,
        )
        .render(area, &mut buf);

        let screen: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        assert!(screen.contains("Fiscal KPIs"));
        assert!(screen.contains("1,200 kept"));
        assert!(screen.contains("3 skipped"));
    }
}
