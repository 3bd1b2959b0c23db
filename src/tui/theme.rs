//! Terminal theme detection and color definitions

use ratatui::style::Color;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Heat intensity level for variance table cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatLevel {
    None,
    Low,
    Medium,
    High,
    Max,
}

/// Bucket a cell value relative to the largest cell in the table.
/// Zero cells (and an all-zero table) are `None`.
pub fn heat_level(value: Decimal, max: Decimal) -> HeatLevel {
    if value <= Decimal::ZERO || max <= Decimal::ZERO {
        return HeatLevel::None;
    }
    let ratio = (value / max).to_f64().unwrap_or(0.0);
    if ratio <= 0.25 {
        HeatLevel::Low
    } else if ratio <= 0.5 {
        HeatLevel::Medium
    } else if ratio <= 0.75 {
        HeatLevel::High
    } else {
        HeatLevel::Max
    }
}

/// Terminal color scheme (dark or light background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Auto-detect terminal theme from background luminance.
    /// Must be called **before** entering raw mode (ratatui::init).
    /// Falls back to Dark if detection fails.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::Light,
            _ => Self::Dark,
        }
    }

    /// Primary text color
    pub fn text(self) -> Color {
        match self {
            Self::Dark => Color::White,
            Self::Light => Color::Black,
        }
    }

    /// Selected tab, keybinding keys, dealer and model names
    pub fn accent(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Light => Color::Indexed(25),
        }
    }

    /// Separators, inactive tabs, hints
    pub fn muted(self) -> Color {
        match self {
            Self::Dark => Color::DarkGray,
            Self::Light => Color::Gray,
        }
    }

    /// Month / quarter labels
    pub fn period(self) -> Color {
        match self {
            Self::Dark => Color::Yellow,
            Self::Light => Color::Indexed(130),
        }
    }

    /// Revenue amounts
    pub fn revenue(self) -> Color {
        match self {
            Self::Dark => Color::Magenta,
            Self::Light => Color::Indexed(90),
        }
    }

    /// Bars and sparklines
    pub fn bar(self) -> Color {
        match self {
            Self::Dark => Color::Green,
            Self::Light => Color::Indexed(22),
        }
    }

    /// Skipped rows, errors
    pub fn error(self) -> Color {
        match self {
            Self::Dark => Color::Red,
            Self::Light => Color::Indexed(124),
        }
    }

    /// Flagged rows, active filters
    pub fn warning(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(208),
            Self::Light => Color::Indexed(166),
        }
    }

    /// KPI card accent (averages)
    pub fn stat_blue(self) -> Color {
        match self {
            Self::Dark => Color::Blue,
            Self::Light => Color::Indexed(25),
        }
    }

    /// KPI card accent (top dealer)
    pub fn stat_warm(self) -> Color {
        match self {
            Self::Dark => Color::LightRed,
            Self::Light => Color::Red,
        }
    }

    /// Background for a variance heat cell
    pub fn heat_color(self, level: HeatLevel) -> Color {
        match self {
            Self::Dark => match level {
                HeatLevel::None => Color::Indexed(236),
                HeatLevel::Low => Color::Indexed(22),
                HeatLevel::Medium => Color::Indexed(28),
                HeatLevel::High => Color::Indexed(34),
                HeatLevel::Max => Color::Indexed(40),
            },
            Self::Light => match level {
                HeatLevel::None => Color::Indexed(254),
                HeatLevel::Low => Color::Indexed(194),
                HeatLevel::Medium => Color::Indexed(157),
                HeatLevel::High => Color::Indexed(71),
                HeatLevel::Max => Color::Indexed(28),
            },
        }
    }

    /// Readable foreground on top of a heat cell
    pub fn heat_text(self, level: HeatLevel) -> Color {
        match (self, level) {
            (Self::Dark, _) => Color::White,
            (Self::Light, HeatLevel::High | HeatLevel::Max) => Color::White,
            (Self::Light, _) => Color::Black,
        }
    }
}
