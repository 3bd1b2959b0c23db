//! Tab bar widget for view navigation

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::tui::theme::Theme;

/// Dashboard views, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Trends,
    Variance,
    Models,
    Revenue,
    Seasonal,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Trends => "Trends",
            Self::Variance => "Variance",
            Self::Models => "Models",
            Self::Revenue => "Revenue",
            Self::Seasonal => "Seasonal",
        }
    }

    pub fn all() -> &'static [Tab] {
        &[
            Tab::Overview,
            Tab::Trends,
            Tab::Variance,
            Tab::Models,
            Tab::Revenue,
            Tab::Seasonal,
        ]
    }

    /// Zero-based position in the tab bar
    pub fn index(self) -> usize {
        match self {
            Self::Overview => 0,
            Self::Trends => 1,
            Self::Variance => 2,
            Self::Models => 3,
            Self::Revenue => 4,
            Self::Seasonal => 5,
        }
    }

    /// Next tab (wrapping)
    pub fn next(self) -> Self {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    /// Previous tab (wrapping)
    pub fn prev(self) -> Self {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }

    /// Tab from number key (1-6)
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1..=6 => Some(Self::all()[(n - 1) as usize]),
            _ => None,
        }
    }
}

/// Tab bar widget showing available views
pub struct TabBar {
    selected: Tab,
    theme: Theme,
}

impl TabBar {
    pub fn new(selected: Tab, theme: Theme) -> Self {
        Self { selected, theme }
    }
}

impl Widget for TabBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        // "[n Label]" for the selected tab, "n Label" otherwise, two spaces apart
        let labels: Vec<String> = Tab::all()
            .iter()
            .map(|tab| {
                let label = format!("{} {}", tab.index() + 1, tab.label());
                if *tab == self.selected {
                    format!("[{}]", label)
                } else {
                    label
                }
            })
            .collect();

        let total_width: u16 = labels
            .iter()
            .map(|l| l.len() as u16 + 2)
            .sum::<u16>()
            .saturating_sub(2);

        let mut x = area.x + (area.width.saturating_sub(total_width)) / 2;

        for (tab, display) in Tab::all().iter().zip(&labels) {
            let display_len = display.len() as u16;
            if x + display_len > area.x + area.width {
                break;
            }

            let style = if *tab == self.selected {
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted())
            };

            buf.set_string(x, area.y, display, style);
            x += display_len + 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_all_order() {
        let labels: Vec<&str> = Tab::all().iter().map(|t| t.label()).collect();
        assert_eq!(
            labels,
            vec!["Overview", "Trends", "Variance", "Models", "Revenue", "Seasonal"]
        );
    }

    #[test]
    fn test_tab_index_matches_position() {
        for (i, tab) in Tab::all().iter().enumerate() {
            assert_eq!(tab.index(), i);
        }
    }

    #[test]
    fn test_tab_next_wraps() {
        assert_eq!(Tab::Overview.next(), Tab::Trends);
        assert_eq!(Tab::Revenue.next(), Tab::Seasonal);
        assert_eq!(Tab::Seasonal.next(), Tab::Overview);
    }

    #[test]
    fn test_tab_prev_wraps() {
        assert_eq!(Tab::Overview.prev(), Tab::Seasonal);
        assert_eq!(Tab::Trends.prev(), Tab::Overview);
    }

    #[test]
    fn test_tab_default() {
        assert_eq!(Tab::default(), Tab::Overview);
    }

    #[test]
    fn test_tab_from_number() {
        assert_eq!(Tab::from_number(1), Some(Tab::Overview));
        assert_eq!(Tab::from_number(3), Some(Tab::Variance));
        assert_eq!(Tab::from_number(6), Some(Tab::Seasonal));
        assert_eq!(Tab::from_number(0), None);
        assert_eq!(Tab::from_number(7), None);
    }

    #[test]
    fn test_tab_bar_highlights_selected() {
        let area = Rect::new(0, 0, 120, 1);
        let mut buf = Buffer::empty(area);
        TabBar::new(Tab::Variance, Theme::Dark).render(area, &mut buf);

        let rendered: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(rendered.contains("[3 Variance]"));
        assert!(rendered.contains("1 Overview"));
    }
}
