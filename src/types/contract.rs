//! Contract record types

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Source country of a contract export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Country {
    France,
    Italy,
}

impl Country {
    /// Load order of the two sources
    pub fn all() -> &'static [Country] {
        &[Country::France, Country::Italy]
    }

    /// ISO 3166 alpha-2 code
    pub fn code(self) -> &'static str {
        match self {
            Self::France => "FR",
            Self::Italy => "IT",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Columns of the contract CSV schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    ContractStartDate,
    ContractEndDate,
    DealerId,
    ModelDescription,
    FuelTypeCode,
    ContractStatus,
    TotalCapitalAmount,
}

impl Field {
    pub fn all() -> &'static [Field] {
        &[
            Field::ContractStartDate,
            Field::ContractEndDate,
            Field::DealerId,
            Field::ModelDescription,
            Field::FuelTypeCode,
            Field::ContractStatus,
            Field::TotalCapitalAmount,
        ]
    }

    /// Canonical header name as exported by the dealer systems
    pub fn header(self) -> &'static str {
        match self {
            Self::ContractStartDate => "contractstartdate",
            Self::ContractEndDate => "contractenddate",
            Self::DealerId => "dealerbpid",
            Self::ModelDescription => "modeldescription",
            Self::FuelTypeCode => "fueltypecode",
            Self::ContractStatus => "contract_status",
            Self::TotalCapitalAmount => "totalcapitalamount",
        }
    }
}

/// Group label used for absent categorical values
pub const UNKNOWN_LABEL: &str = "unknown";

/// One contract row, typed and validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub country: Country,
    pub dealer_id: String,
    pub model_description: Option<String>,
    pub fuel_type_code: Option<String>,
    pub contract_start_date: NaiveDate,
    /// `None` for open-ended contracts
    pub contract_end_date: Option<NaiveDate>,
    pub contract_status: String,
    /// Status matched the configured active marker at load time
    pub active: bool,
    pub total_capital_amount: Decimal,
}

impl ContractRecord {
    /// Model label for grouping (None → "unknown")
    pub fn model_label(&self) -> &str {
        self.model_description.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    /// Fuel type label for grouping (None → "unknown")
    pub fn fuel_label(&self) -> &str {
        self.fuel_type_code.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

/// Row-level anomalies that are kept but reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationFlag {
    /// contract_end_date precedes contract_start_date
    EndBeforeStart,
    /// contract_start_date lies after the load date
    FutureStart,
}

impl ValidationFlag {
    pub fn describe(self) -> &'static str {
        match self {
            Self::EndBeforeStart => "contract ends before it starts",
            Self::FutureStart => "contract starts in the future",
        }
    }
}

/// A flagged row, identified by source and line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedRow {
    pub country: Country,
    pub line: u64,
    pub dealer_id: String,
    pub flag: ValidationFlag,
}
