//! Plain-text renderers for the non-interactive subcommands
//!
//! Each renderer returns the full report as a `String`; the caller prints it.

use std::fmt::Write;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::services::data_loader::LoadReport;
use crate::services::{Aggregator, RecordFilter};
use crate::tui::widgets::overview::{format_amount, format_number};
use crate::types::{
    sum_amounts, ContractRecord, FiscalKpis, GroupSummary, TrendPoint, VarianceTable,
};

/// Monthly trend over a filtered record set, as printed by `trend`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub fuel_types: Vec<String>,
    pub models: Vec<String>,
    pub contract_count: usize,
    pub total_revenue: Decimal,
    pub points: Vec<TrendPoint>,
}

impl TrendReport {
    pub fn new(filter: &RecordFilter, records: &[&ContractRecord]) -> Self {
        let points = Aggregator::monthly_trend(records.iter().copied());
        Self {
            from: filter.from,
            to: filter.to,
            fuel_types: filter.fuel_types.clone(),
            models: filter.models.clone(),
            contract_count: records.len(),
            total_revenue: sum_amounts(points.iter().map(|p| p.revenue)),
            points,
        }
    }
}

pub fn render_kpis(kpis: &FiscalKpis) -> String {
    let mut out = String::new();
    let top = match &kpis.top_dealer {
        Some(top) => format!("{} ({})", top.dealer_id, format_amount(top.revenue)),
        None => "-".to_string(),
    };
    let rows = [
        ("Total revenue", format_amount(kpis.total_revenue)),
        ("Dealers", format_number(kpis.dealer_count)),
        ("Avg revenue / dealer", format_amount(kpis.avg_revenue_per_dealer)),
        ("Top dealer", top),
        ("Active contracts", format_number(kpis.active_contracts)),
        ("Contracts", format_number(kpis.contract_count)),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{:<22}{:>24}", label, value);
    }
    out
}

pub fn render_summary(key_label: &str, groups: &[GroupSummary]) -> String {
    let mut out = String::new();
    let width = groups
        .iter()
        .map(|g| g.key.chars().count())
        .chain(std::iter::once(key_label.len()))
        .max()
        .unwrap_or(0)
        + 2;

    let _ = writeln!(
        out,
        "{:<width$}{:>11}{:>9}{:>20}",
        key_label, "Contracts", "Active", "Revenue"
    );
    for group in groups {
        let _ = writeln!(
            out,
            "{:<width$}{:>11}{:>9}{:>20}",
            group.key,
            format_number(group.kpi.count),
            format_number(group.kpi.active_count),
            format_amount(group.kpi.total_capital),
        );
    }
    let total = sum_amounts(groups.iter().map(|g| g.kpi.total_capital));
    let count: u64 = groups.iter().map(|g| g.kpi.count).sum();
    let active: u64 = groups.iter().map(|g| g.kpi.active_count).sum();
    let _ = writeln!(
        out,
        "{:<width$}{:>11}{:>9}{:>20}",
        "Total",
        format_number(count),
        format_number(active),
        format_amount(total),
    );
    out
}

pub fn render_trend(report: &TrendReport) -> String {
    let mut out = String::new();
    if report.points.is_empty() {
        out.push_str("No contracts match the filter\n");
        return out;
    }

    let _ = writeln!(out, "{:<10}{:>20}", "Month", "Revenue");
    for point in &report.points {
        let _ = writeln!(
            out,
            "{:<10}{:>20}",
            point.month.to_string(),
            format_amount(point.revenue)
        );
    }
    let _ = writeln!(
        out,
        "{:<10}{:>20}  ({} contracts)",
        "Total",
        format_amount(report.total_revenue),
        format_number(report.contract_count as u64)
    );
    out
}

pub fn render_variance(table: &VarianceTable) -> String {
    let mut out = String::new();
    if table.rows.is_empty() {
        out.push_str("No Q1/Q4 revenue to compare\n");
        return out;
    }

    let _ = write!(out, "{:<18}", "Dealer");
    for quarter in &table.quarters {
        let _ = write!(out, "{:>16}", quarter.to_string());
    }
    let _ = writeln!(out, "{:>18}", "Variance");

    for row in &table.rows {
        let _ = write!(out, "{:<18}", row.dealer_id);
        for cell in &row.cells {
            let _ = write!(out, "{:>16}", format_amount(*cell));
        }
        let _ = writeln!(out, "{:>18}", format_amount(row.variance));
    }
    out
}

pub fn render_validation(report: &LoadReport<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} records loaded", format_number(report.records as u64));
    for source in report.sources {
        let _ = writeln!(
            out,
            "  {:<8} kept {:>8}  skipped {:>6}  flagged {:>6}",
            source.country.to_string(),
            format_number(source.kept as u64),
            format_number(source.skipped as u64),
            format_number(source.flagged as u64),
        );
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped rows:");
        for err in report.skipped {
            let _ = writeln!(out, "  {}", err);
        }
    }
    if !report.flags.is_empty() {
        let _ = writeln!(out, "\nFlagged rows:");
        for flag in report.flags {
            let _ = writeln!(
                out,
                "  {} line {}: dealer {}: {}",
                flag.country,
                flag.line,
                flag.dealer_id,
                flag.flag.describe()
            );
        }
    }
    out
}
