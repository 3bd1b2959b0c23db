//! KPI and report types

use rust_decimal::Decimal;
use serde::Serialize;

use super::{ContractRecord, Month, Quarter};

/// Count / sum / active-count summary over a group of contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Kpi {
    pub count: u64,
    pub total_capital: Decimal,
    pub active_count: u64,
}

/// Sum of money amounts, exact until it saturates at `Decimal::MAX`
pub fn sum_amounts<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
}

impl Kpi {
    pub fn add(&mut self, record: &ContractRecord) {
        self.count = self.count.saturating_add(1);
        self.total_capital = match self.total_capital.checked_add(record.total_capital_amount) {
            Some(sum) => sum,
            None => {
                tracing::warn!(
                    dealer = %record.dealer_id,
                    amount = %record.total_capital_amount,
                    "capital total overflowed, saturating"
                );
                Decimal::MAX
            }
        };
        if record.active {
            self.active_count = self.active_count.saturating_add(1);
        }
    }
}

/// KPI for one group key, in report order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    #[serde(flatten)]
    pub kpi: Kpi,
}

/// Headline cards of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FiscalKpis {
    pub total_revenue: Decimal,
    pub dealer_count: u64,
    pub avg_revenue_per_dealer: Decimal,
    pub top_dealer: Option<DealerRevenue>,
    pub active_contracts: u64,
    pub contract_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealerRevenue {
    pub dealer_id: String,
    pub revenue: Decimal,
}

/// Revenue for one month of the trend series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub month: Month,
    pub revenue: Decimal,
}

/// Dealer row of the Q1/Q4 comparison table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarianceRow {
    pub dealer_id: String,
    /// One cell per `VarianceTable::quarters` column
    pub cells: Vec<Decimal>,
    pub variance: Decimal,
}

/// Dealer × quarter revenue restricted to Q1 and Q4 columns
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VarianceTable {
    pub quarters: Vec<Quarter>,
    pub rows: Vec<VarianceRow>,
}

impl VarianceTable {
    /// Largest cell value (for heat scaling)
    pub fn max_cell(&self) -> Decimal {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter().copied())
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Revenue for one (model, fuel type) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelFuelRow {
    pub model: String,
    pub fuel_type: String,
    pub revenue: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Country;
    use chrono::NaiveDate;

    fn make_record(amount: i64, active: bool) -> ContractRecord {
        ContractRecord {
            country: Country::Italy,
            dealer_id: "A".to_string(),
            model_description: None,
            fuel_type_code: None,
            contract_start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            contract_end_date: None,
            contract_status: if active { "LIVE" } else { "CLOSED" }.to_string(),
            active,
            total_capital_amount: Decimal::from(amount),
        }
    }

    #[test]
    fn test_kpi_default_is_zero() {
        let kpi = Kpi::default();
        assert_eq!(kpi.count, 0);
        assert_eq!(kpi.total_capital, Decimal::ZERO);
        assert_eq!(kpi.active_count, 0);
    }

    #[test]
    fn test_kpi_add() {
        let mut kpi = Kpi::default();
        kpi.add(&make_record(100, true));
        kpi.add(&make_record(50, false));

        assert_eq!(kpi.count, 2);
        assert_eq!(kpi.total_capital, Decimal::from(150));
        assert_eq!(kpi.active_count, 1);
    }

    #[test]
    fn test_kpi_add_saturates_on_overflow() {
        let mut kpi = Kpi::default();
        let mut huge = make_record(0, true);
        huge.total_capital_amount = Decimal::MAX;
        kpi.add(&huge);
        kpi.add(&huge);

        assert_eq!(kpi.count, 2);
        assert_eq!(kpi.total_capital, Decimal::MAX);
        assert_eq!(kpi.active_count, 2);
    }

    #[test]
    fn test_sum_amounts() {
        let amounts = [Decimal::new(150, 2), Decimal::from(2)];
        assert_eq!(sum_amounts(amounts), Decimal::new(350, 2));
        assert_eq!(sum_amounts([Decimal::MAX, Decimal::ONE]), Decimal::MAX);
        assert_eq!(sum_amounts(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_group_summary_serializes_flat() {
        let summary = GroupSummary {
            key: "A".to_string(),
            kpi: Kpi {
                count: 2,
                total_capital: Decimal::new(15050, 2),
                active_count: 1,
            },
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["key"], "A");
        assert_eq!(json["count"], 2);
        assert_eq!(json["total_capital"], "150.50");
        assert_eq!(json["active_count"], 1);
    }

    #[test]
    fn test_variance_table_max_cell() {
        let table = VarianceTable {
            quarters: Vec::new(),
            rows: vec![
                VarianceRow {
                    dealer_id: "A".into(),
                    cells: vec![Decimal::from(10), Decimal::from(40)],
                    variance: Decimal::from(30),
                },
                VarianceRow {
                    dealer_id: "B".into(),
                    cells: vec![Decimal::from(25), Decimal::ZERO],
                    variance: Decimal::from(25),
                },
            ],
        };
        assert_eq!(table.max_cell(), Decimal::from(40));
        assert_eq!(VarianceTable::default().max_cell(), Decimal::ZERO);
    }
}
