//! Read-only contract store
//!
//! Built once at startup and passed by reference to every query.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::types::ContractRecord;

/// Record filter used by the trend view. Empty sets do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Inclusive lower bound on contract_start_date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on contract_start_date
    pub to: Option<NaiveDate>,
    pub fuel_types: Vec<String>,
    pub models: Vec<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &ContractRecord) -> bool {
        if self.from.is_some_and(|from| record.contract_start_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| record.contract_start_date > to) {
            return false;
        }
        if !self.fuel_types.is_empty()
            && !record
                .fuel_type_code
                .as_ref()
                .is_some_and(|f| self.fuel_types.contains(f))
        {
            return false;
        }
        if !self.models.is_empty()
            && !record
                .model_description
                .as_ref()
                .is_some_and(|m| self.models.contains(m))
        {
            return false;
        }
        true
    }
}

/// Loaded contracts, France rows first, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractStore {
    records: Vec<ContractRecord>,
}

impl ContractStore {
    pub fn new(records: Vec<ContractRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ContractRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest contract_start_date
    pub fn start_date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.contract_start_date).min()?;
        let max = self.records.iter().map(|r| r.contract_start_date).max()?;
        Some((min, max))
    }

    /// Distinct fuel type codes in first-appearance order
    pub fn fuel_types(&self) -> Vec<String> {
        distinct(self.records.iter().filter_map(|r| r.fuel_type_code.as_deref()))
    }

    /// Distinct model descriptions in first-appearance order
    pub fn models(&self) -> Vec<String> {
        distinct(
            self.records
                .iter()
                .filter_map(|r| r.model_description.as_deref()),
        )
    }

    pub fn filter(&self, filter: &RecordFilter) -> Vec<&ContractRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Country;
    use rust_decimal::Decimal;

    fn make_record(
        dealer: &str,
        day: u32,
        model: Option<&str>,
        fuel: Option<&str>,
    ) -> ContractRecord {
        ContractRecord {
            country: Country::France,
            dealer_id: dealer.to_string(),
            model_description: model.map(String::from),
            fuel_type_code: fuel.map(String::from),
            contract_start_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            contract_end_date: None,
            contract_status: "LIVE".to_string(),
            active: true,
            total_capital_amount: Decimal::from(100),
        }
    }

    fn make_store() -> ContractStore {
        ContractStore::new(vec![
            make_record("A", 10, Some("Clio"), Some("PE")),
            make_record("B", 2, Some("Megane"), Some("DI")),
            make_record("A", 20, Some("Clio"), Some("EL")),
            make_record("C", 15, None, None),
        ])
    }

    #[test]
    fn test_empty_store() {
        let store = ContractStore::default();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.start_date_range(), None);
        assert!(store.fuel_types().is_empty());
    }

    #[test]
    fn test_start_date_range() {
        let store = make_store();
        let (min, max) = store.start_date_range().unwrap();
        assert_eq!(min.to_string(), "2024-05-02");
        assert_eq!(max.to_string(), "2024-05-20");
    }

    #[test]
    fn test_distinct_values_first_appearance_order() {
        let store = make_store();
        assert_eq!(store.fuel_types(), vec!["PE", "DI", "EL"]);
        assert_eq!(store.models(), vec!["Clio", "Megane"]);
    }

    // ========== RecordFilter tests ==========

    #[test]
    fn test_default_filter_keeps_everything() {
        let store = make_store();
        assert_eq!(store.filter(&RecordFilter::default()).len(), 4);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let store = make_store();
        let filter = RecordFilter {
            from: NaiveDate::from_ymd_opt(2024, 5, 10),
            to: NaiveDate::from_ymd_opt(2024, 5, 15),
            ..Default::default()
        };
        let days: Vec<String> = store
            .filter(&filter)
            .iter()
            .map(|r| r.contract_start_date.to_string())
            .collect();
        assert_eq!(days, vec!["2024-05-10", "2024-05-15"]);
    }

    #[test]
    fn test_fuel_filter_excludes_missing_fuel() {
        let store = make_store();
        let filter = RecordFilter {
            fuel_types: vec!["PE".to_string(), "EL".to_string()],
            ..Default::default()
        };
        let result = store.filter(&filter);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|r| r.dealer_id == "A"));
    }

    #[test]
    fn test_fuel_and_model_filters_combine() {
        let store = make_store();
        let filter = RecordFilter {
            fuel_types: vec!["DI".to_string(), "PE".to_string()],
            models: vec!["Megane".to_string()],
            ..Default::default()
        };
        let result = store.filter(&filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].dealer_id, "B");
    }
}
