//! Seasonal view widget - revenue by season and by calendar quarter

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use rust_decimal::Decimal;

use super::chrome::{self, VISIBLE_ROWS};
use super::overview::format_amount;
use super::tabs::{Tab, TabBar};
use super::trends::format_sparkline;
use crate::services::{Aggregator, GroupKey};
use crate::tui::theme::Theme;
use crate::types::{ContractRecord, Quarter, Season};

/// Season rows shown above the quarterly series
const SEASON_ROWS: u16 = 4;
/// Rows left for the quarterly series
const QUARTER_ROWS: usize = VISIBLE_ROWS - SEASON_ROWS as usize - 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonalData {
    /// Always Q1..Q4, zero when a season has no contracts
    pub seasons: Vec<(Season, Decimal)>,
    /// Chronological
    pub quarters: Vec<(Quarter, Decimal)>,
}

impl SeasonalData {
    pub fn from_records(records: &[ContractRecord]) -> Self {
        let grouping = Aggregator::group_by(records, GroupKey::Season);
        let seasons = Season::all()
            .iter()
            .map(|&season| {
                let revenue = grouping
                    .get(season.label())
                    .map(|group| Aggregator::summarize(group).total_capital)
                    .unwrap_or(Decimal::ZERO);
                (season, revenue)
            })
            .collect();

        Self {
            seasons,
            quarters: Aggregator::quarterly_revenue(records),
        }
    }

    fn max_season(&self) -> Decimal {
        self.seasons
            .iter()
            .map(|(_, v)| *v)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    fn max_quarter(&self) -> Decimal {
        self.quarters
            .iter()
            .map(|(_, v)| *v)
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Label(12) + Revenue(22) + Bar(4 + 30)
const TABLE_WIDTH: u16 = 68;
const BAR_WIDTH: usize = 30;

pub struct SeasonalView<'a> {
    data: &'a SeasonalData,
    scroll_offset: usize,
    theme: Theme,
}

impl<'a> SeasonalView<'a> {
    pub fn new(data: &'a SeasonalData, scroll_offset: usize, theme: Theme) -> Self {
        Self {
            data,
            scroll_offset,
            theme,
        }
    }

    /// Only the quarterly series scrolls
    pub fn max_scroll_offset(data: &SeasonalData) -> usize {
        data.quarters.len().saturating_sub(QUARTER_ROWS)
    }
}

impl Widget for SeasonalView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = chrome::centered(area);
        let quarter_rows = self.data.quarters.len().clamp(1, QUARTER_ROWS) as u16;

        let chunks = Layout::vertical([
            Constraint::Length(1),            // Top padding
            Constraint::Length(1),            // Tabs
            Constraint::Length(1),            // Separator
            Constraint::Length(1),            // Season title
            Constraint::Length(SEASON_ROWS),  // Season rows
            Constraint::Length(1),            // Blank
            Constraint::Length(1),            // Quarter title
            Constraint::Length(quarter_rows), // Quarter rows
            Constraint::Min(0),               // Remaining space
            Constraint::Length(1),            // Separator
            Constraint::Length(1),            // Keybindings
        ])
        .split(area);

        TabBar::new(Tab::Seasonal, self.theme).render(chunks[1], buf);
        chrome::render_separator(chunks[2], buf, self.theme);
        self.render_section_title(chunks[3], buf, "By season (all years)");
        self.render_seasons(chunks[4], buf);
        self.render_section_title(chunks[6], buf, "By quarter");
        self.render_quarters(chunks[7], buf);
        chrome::render_separator(chunks[9], buf, self.theme);
        chrome::render_keybindings(chunks[10], buf, &[("↑↓", "Scroll")], self.theme);
    }
}

impl SeasonalView<'_> {
    fn table_rect(&self, area: Rect, y: u16) -> Rect {
        Rect {
            x: area.x + chrome::table_offset(area.width, TABLE_WIDTH),
            y,
            width: TABLE_WIDTH.min(area.width),
            height: 1,
        }
    }

    fn render_section_title(&self, area: Rect, buf: &mut Buffer, title: &str) {
        Paragraph::new(Span::styled(
            title.to_string(),
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        ))
        .render(self.table_rect(area, area.y), buf);
    }

    fn render_bar_row(
        &self,
        area: Rect,
        y: u16,
        buf: &mut Buffer,
        label: String,
        value: Decimal,
        max: Decimal,
    ) {
        let line = Line::from(vec![
            Span::styled(
                format!("{:<12}", label),
                Style::default().fg(self.theme.period()),
            ),
            Span::styled(
                format!("{:>22}", format_amount(value)),
                Style::default().fg(self.theme.revenue()),
            ),
            Span::raw("    "),
            Span::styled(
                format_sparkline(value, max, BAR_WIDTH),
                Style::default().fg(self.theme.bar()),
            ),
        ]);
        Paragraph::new(line).render(self.table_rect(area, y), buf);
    }

    fn render_seasons(&self, area: Rect, buf: &mut Buffer) {
        let max = self.data.max_season();
        for (i, (season, revenue)) in self
            .data
            .seasons
            .iter()
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            self.render_bar_row(area, y, buf, season.to_string(), *revenue, max);
        }
    }

    fn render_quarters(&self, area: Rect, buf: &mut Buffer) {
        if self.data.quarters.is_empty() {
            Paragraph::new(Span::styled(
                "No contracts loaded",
                Style::default().fg(self.theme.muted()),
            ))
            .alignment(Alignment::Center)
            .render(area, buf);
            return;
        }

        let max = self.data.max_quarter();
        for (i, (quarter, revenue)) in self
            .data
            .quarters
            .iter()
            .skip(self.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            self.render_bar_row(area, y, buf, quarter.to_string(), *revenue, max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Country;
    use chrono::NaiveDate;

    fn make_record(year: i32, month: u32, amount: i64) -> ContractRecord {
        ContractRecord {
            country: Country::Italy,
            dealer_id: "D1".into(),
            model_description: None,
            fuel_type_code: None,
            contract_start_date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            contract_end_date: None,
            contract_status: "LIVE".into(),
            active: true,
            total_capital_amount: Decimal::from(amount),
        }
    }

    #[test]
    fn test_seasonal_data_always_has_four_seasons() {
        let records = vec![make_record(2023, 2, 10), make_record(2024, 1, 5)];
        let data = SeasonalData::from_records(&records);

        assert_eq!(
            data.seasons,
            vec![
                (Season::Q1, Decimal::from(15)),
                (Season::Q2, Decimal::ZERO),
                (Season::Q3, Decimal::ZERO),
                (Season::Q4, Decimal::ZERO),
            ]
        );
        assert_eq!(data.quarters.len(), 2);
        assert_eq!(data.quarters[0].0.to_string(), "2023Q1");
    }

    #[test]
    fn test_seasonal_totals_match_quarters() {
        let records = vec![
            make_record(2023, 5, 10),
            make_record(2023, 11, 20),
            make_record(2024, 8, 30),
        ];
        let data = SeasonalData::from_records(&records);

        let by_season: Decimal = data.seasons.iter().map(|(_, v)| *v).sum();
        let by_quarter: Decimal = data.quarters.iter().map(|(_, v)| *v).sum();
        assert_eq!(by_season, by_quarter);
        assert_eq!(data.max_season(), Decimal::from(30));
    }

    #[test]
    fn test_seasonal_scroll_bounds() {
        let records: Vec<ContractRecord> = (2000..2010)
            .flat_map(|y| [make_record(y, 1, 1), make_record(y, 7, 1)])
            .collect();
        let data = SeasonalData::from_records(&records);
        assert_eq!(data.quarters.len(), 20);
        assert_eq!(SeasonalView::max_scroll_offset(&data), 20 - QUARTER_ROWS);
    }
}
