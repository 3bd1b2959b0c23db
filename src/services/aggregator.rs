//! Aggregator service for computing contract KPIs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;

use crate::services::period::{fiscal_year_of, month_of, quarter_of, seasonal_bucket};
use crate::types::{
    ContractRecord, DealerRevenue, FiscalKpis, GroupSummary, Kpi, ModelFuelRow, Quarter, Season,
    TrendPoint, VarianceRow, VarianceTable,
};

/// Grouping dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Dealer,
    Model,
    FuelType,
    Month,
    Quarter,
    Season,
    FiscalYear { start_month: u32 },
    Country,
}

impl GroupKey {
    /// Group label for a record
    pub fn key_for(self, record: &ContractRecord) -> String {
        let date = record.contract_start_date;
        match self {
            Self::Dealer => record.dealer_id.clone(),
            Self::Model => record.model_label().to_string(),
            Self::FuelType => record.fuel_label().to_string(),
            Self::Month => month_of(date).to_string(),
            Self::Quarter => quarter_of(date).to_string(),
            Self::Season => seasonal_bucket(date).to_string(),
            Self::FiscalYear { start_month } => fiscal_year_of(date, start_month).to_string(),
            Self::Country => record.country.code().to_string(),
        }
    }

    /// Column header for reports
    pub fn label(self) -> &'static str {
        match self {
            Self::Dealer => "Dealer",
            Self::Model => "Model",
            Self::FuelType => "Fuel",
            Self::Month => "Month",
            Self::Quarter => "Quarter",
            Self::Season => "Season",
            Self::FiscalYear { .. } => "Fiscal year",
            Self::Country => "Country",
        }
    }

    /// Period keys sort chronologically by their label
    pub fn is_period(self) -> bool {
        matches!(
            self,
            Self::Month | Self::Quarter | Self::Season | Self::FiscalYear { .. }
        )
    }
}

/// Records grouped by key, in first-appearance order
#[derive(Debug, Clone, Default)]
pub struct Grouping<'a> {
    index: HashMap<String, usize>,
    groups: Vec<(String, Vec<&'a ContractRecord>)>,
}

impl<'a> Grouping<'a> {
    pub fn get(&self, key: &str) -> Option<&[&'a ContractRecord]> {
        self.index.get(key).map(|&i| self.groups[i].1.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a ContractRecord])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Aggregator for computing contract statistics
pub struct Aggregator;

impl Aggregator {
    /// Group records by key. Groups keep first-appearance order.
    pub fn group_by<'a, I>(records: I, key: GroupKey) -> Grouping<'a>
    where
        I: IntoIterator<Item = &'a ContractRecord>,
    {
        let mut grouping = Grouping::default();
        for record in records {
            let label = key.key_for(record);
            match grouping.index.get(&label) {
                Some(&i) => grouping.groups[i].1.push(record),
                None => {
                    grouping.index.insert(label.clone(), grouping.groups.len());
                    grouping.groups.push((label, vec![record]));
                }
            }
        }
        grouping
    }

    /// Count, exact capital sum and active count over a group
    pub fn summarize(group: &[&ContractRecord]) -> Kpi {
        Self::total(group.iter().copied())
    }

    /// Kpi over any record iterator
    pub fn total<'a, I>(records: I) -> Kpi
    where
        I: IntoIterator<Item = &'a ContractRecord>,
    {
        let mut kpi = Kpi::default();
        for record in records {
            kpi.add(record);
        }
        kpi
    }

    /// group_by + summarize, in first-appearance order
    pub fn summarize_by<'a, I>(records: I, key: GroupKey) -> Vec<GroupSummary>
    where
        I: IntoIterator<Item = &'a ContractRecord>,
    {
        Self::group_by(records, key)
            .iter()
            .map(|(k, group)| GroupSummary {
                key: k.to_string(),
                kpi: Self::summarize(group),
            })
            .collect()
    }

    /// Dealers by revenue descending (ties keep first-appearance order)
    pub fn revenue_by_dealer<'a, I>(records: I) -> Vec<GroupSummary>
    where
        I: IntoIterator<Item = &'a ContractRecord>,
    {
        let mut dealers = Self::summarize_by(records, GroupKey::Dealer);
        dealers.sort_by(|a, b| b.kpi.total_capital.cmp(&a.kpi.total_capital));
        dealers
    }

    /// Headline fiscal KPIs
    pub fn fiscal_kpis<'a, I>(records: I) -> FiscalKpis
    where
        I: IntoIterator<Item = &'a ContractRecord>,
    {
        let dealers = Self::summarize_by(records, GroupKey::Dealer);
        if dealers.is_empty() {
            return FiscalKpis::default();
        }

        let mut kpis = FiscalKpis {
            dealer_count: dealers.len() as u64,
            ..Default::default()
        };

        let mut top: Option<&GroupSummary> = None;
        for dealer in &dealers {
            kpis.total_revenue = kpis
                .total_revenue
                .saturating_add(dealer.kpi.total_capital);
            kpis.active_contracts = kpis
                .active_contracts
                .saturating_add(dealer.kpi.active_count);
            kpis.contract_count = kpis.contract_count.saturating_add(dealer.kpi.count);

            match top {
                Some(best) if dealer.kpi.total_capital <= best.kpi.total_capital => {}
                _ => top = Some(dealer),
            }
        }

        kpis.avg_revenue_per_dealer =
            (kpis.total_revenue / Decimal::from(kpis.dealer_count)).round_dp(2);
        kpis.top_dealer = top.map(|d| DealerRevenue {
            dealer_id: d.key.clone(),
            revenue: d.kpi.total_capital,
        });
        kpis
    }

    /// Revenue per month, chronological
    pub fn monthly_trend<'a, I>(records: I) -> Vec<TrendPoint>
    where
        I: IntoIterator<Item = &'a ContractRecord>,
    {
        let mut by_month = BTreeMap::new();
        for record in records {
            let sum = by_month
                .entry(month_of(record.contract_start_date))
                .or_insert(Decimal::ZERO);
            *sum = sum.saturating_add(record.total_capital_amount);
        }
        by_month
            .into_iter()
            .map(|(month, revenue)| TrendPoint { month, revenue })
            .collect()
    }

    /// Revenue per calendar quarter, chronological
    pub fn quarterly_revenue<'a, I>(records: I) -> Vec<(Quarter, Decimal)>
    where
        I: IntoIterator<Item = &'a ContractRecord>,
    {
        let mut by_quarter = BTreeMap::new();
        for record in records {
            let sum = by_quarter
                .entry(quarter_of(record.contract_start_date))
                .or_insert(Decimal::ZERO);
            *sum = sum.saturating_add(record.total_capital_amount);
        }
        by_quarter.into_iter().collect()
    }

    /// Dealer revenue in Q1 and Q4 quarters, ranked by spread.
    ///
    /// Columns are every Q1/Q4 quarter present in the data, chronological.
    /// Missing cells are zero. `variance` is max − min across a dealer's cells.
    pub fn quarter_variance<'a, I>(records: I, top_n: usize) -> VarianceTable
    where
        I: IntoIterator<Item = &'a ContractRecord>,
    {
        let mut columns: BTreeSet<Quarter> = BTreeSet::new();
        let mut dealers: Vec<(String, BTreeMap<Quarter, Decimal>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in records {
            let slot = match index.get(&record.dealer_id) {
                Some(&i) => i,
                None => {
                    index.insert(record.dealer_id.clone(), dealers.len());
                    dealers.push((record.dealer_id.clone(), BTreeMap::new()));
                    dealers.len() - 1
                }
            };

            let quarter = quarter_of(record.contract_start_date);
            if matches!(quarter.season(), Season::Q1 | Season::Q4) {
                columns.insert(quarter);
                let sum = dealers[slot].1.entry(quarter).or_insert(Decimal::ZERO);
                *sum = sum.saturating_add(record.total_capital_amount);
            }
        }

        let quarters: Vec<Quarter> = columns.into_iter().collect();
        let mut rows: Vec<VarianceRow> = dealers
            .into_iter()
            .map(|(dealer_id, sums)| {
                let cells: Vec<Decimal> = quarters
                    .iter()
                    .map(|q| sums.get(q).copied().unwrap_or(Decimal::ZERO))
                    .collect();
                let max = cells.iter().max().copied().unwrap_or(Decimal::ZERO);
                let min = cells.iter().min().copied().unwrap_or(Decimal::ZERO);
                VarianceRow {
                    dealer_id,
                    cells,
                    variance: max - min,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.variance.cmp(&a.variance));
        rows.truncate(top_n);

        VarianceTable { quarters, rows }
    }

    /// Revenue per (model, fuel type), in first-appearance order
    pub fn model_fuel_breakdown<'a, I>(records: I) -> Vec<ModelFuelRow>
    where
        I: IntoIterator<Item = &'a ContractRecord>,
    {
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let mut rows: Vec<ModelFuelRow> = Vec::new();

        for record in records {
            let key = (
                record.model_label().to_string(),
                record.fuel_label().to_string(),
            );
            match index.get(&key) {
                Some(&i) => {
                    rows[i].revenue = rows[i].revenue.saturating_add(record.total_capital_amount)
                }
                None => {
                    index.insert(key.clone(), rows.len());
                    rows.push(ModelFuelRow {
                        model: key.0,
                        fuel_type: key.1,
                        revenue: record.total_capital_amount,
                    });
                }
            }
        }
        rows
    }
}
