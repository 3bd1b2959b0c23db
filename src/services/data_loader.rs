//! Contract data loading service
//!
//! Reads the France and Italy CSV exports into a single `ContractStore`.
//! A missing file or column aborts the load; a row that cannot be coerced
//! is skipped and reported.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::Config;
use crate::services::schema::ColumnMap;
use crate::services::ContractStore;
use crate::types::{
    ContractRecord, Country, DataLoadError, Field, FlaggedRow, MalformedRowError, ValidationFlag,
};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parse a date cell, keeping only the calendar date.
///
/// Accepts ISO dates, ISO datetimes (with or without offset) and the
/// day-first `DD/MM/YYYY` / `DD.MM.YYYY` forms used by the Italian export.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(cell)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Parse a monetary cell into an exact decimal.
///
/// Whitespace and a euro sign are dropped. When both `,` and `.` appear the
/// rightmost one is the decimal separator; a lone `,` is a decimal comma.
pub fn parse_amount(cell: &str) -> Option<Decimal> {
    let cleaned: String = cell
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Row coercion settings shared by all sources
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Lowercased active status marker
    active_marker: String,
    /// Reference date for future-start detection
    today: NaiveDate,
}

impl LoadOptions {
    pub fn new(active_marker: &str, today: NaiveDate) -> Self {
        Self {
            active_marker: active_marker.trim().to_lowercase(),
            today,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.active_status_marker, Local::now().date_naive())
    }

    fn is_active(&self, status: &str) -> bool {
        status.to_lowercase().contains(&self.active_marker)
    }
}

/// Per-source row counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub country: Country,
    pub kept: usize,
    pub skipped: usize,
    pub flagged: usize,
}

/// Result of loading all sources
#[derive(Debug)]
pub struct LoadResult {
    pub store: ContractStore,
    pub sources: Vec<SourceReport>,
    /// Rows dropped for failing type coercion
    pub skipped: Vec<MalformedRowError>,
    /// Rows kept but flagged for review
    pub flags: Vec<FlaggedRow>,
}

impl LoadResult {
    pub fn report(&self) -> LoadReport<'_> {
        LoadReport {
            records: self.store.len(),
            sources: &self.sources,
            skipped: &self.skipped,
            flags: &self.flags,
        }
    }
}

/// Serializable view of a load for the `validate` command
#[derive(Debug, Serialize)]
pub struct LoadReport<'a> {
    pub records: usize,
    pub sources: &'a [SourceReport],
    pub skipped: &'a [MalformedRowError],
    pub flags: &'a [FlaggedRow],
}

#[derive(Debug, Default)]
struct SourceLoad {
    records: Vec<ContractRecord>,
    skipped: Vec<MalformedRowError>,
    flags: Vec<FlaggedRow>,
}

/// Load contract CSV streams tagged by country.
///
/// Sources are parsed in parallel; records are concatenated in input order,
/// so the result is identical across runs.
pub fn load<R>(sources: Vec<(Country, R)>, options: &LoadOptions) -> Result<LoadResult, DataLoadError>
where
    R: Read + Send,
{
    let loads: Vec<(Country, SourceLoad)> = sources
        .into_par_iter()
        .map(|(country, reader)| parse_source(country, reader, options).map(|l| (country, l)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::new();
    let mut reports = Vec::with_capacity(loads.len());
    let mut skipped = Vec::new();
    let mut flags = Vec::new();

    for (country, load) in loads {
        let report = SourceReport {
            country,
            kept: load.records.len(),
            skipped: load.skipped.len(),
            flagged: load.flags.len(),
        };
        tracing::info!(
            country = %country,
            kept = report.kept,
            skipped = report.skipped,
            flagged = report.flagged,
            "loaded contract source"
        );
        reports.push(report);
        records.extend(load.records);
        skipped.extend(load.skipped);
        flags.extend(load.flags);
    }

    Ok(LoadResult {
        store: ContractStore::new(records),
        sources: reports,
        skipped,
        flags,
    })
}

fn parse_source<R: Read>(
    country: Country,
    reader: R,
    options: &LoadOptions,
) -> Result<SourceLoad, DataLoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = ColumnMap::resolve(rdr.headers()?.iter(), country)?;

    // Rows are read as bytes so a bad encoding skips one row, not the file
    let mut load = SourceLoad::default();
    for (idx, row) in rdr.byte_records().enumerate() {
        let row = row?;
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);

        match parse_row(&columns, &row, country, line, options) {
            Ok(record) => {
                for flag in validation_flags(&record, options.today) {
                    tracing::warn!(
                        country = %country,
                        line,
                        dealer = %record.dealer_id,
                        "{}",
                        flag.describe()
                    );
                    load.flags.push(FlaggedRow {
                        country,
                        line,
                        dealer_id: record.dealer_id.clone(),
                        flag,
                    });
                }
                load.records.push(record);
            }
            Err(err) => {
                tracing::debug!(error = %err, "skipping malformed row");
                load.skipped.push(err);
            }
        }
    }
    Ok(load)
}

fn parse_row(
    columns: &ColumnMap,
    row: &csv::ByteRecord,
    country: Country,
    line: u64,
    options: &LoadOptions,
) -> Result<ContractRecord, MalformedRowError> {
    let malformed = |field: Field, reason: String| MalformedRowError {
        country,
        line,
        field,
        reason,
    };
    let cell = |field: Field| {
        columns
            .cell(row, field)
            .map_err(|_| malformed(field, "invalid UTF-8".into()))
    };
    let optional = |field: Field| {
        cell(field).map(|text| (!text.is_empty()).then(|| text.to_string()))
    };

    let dealer_id = cell(Field::DealerId)?;
    if dealer_id.is_empty() {
        return Err(malformed(Field::DealerId, "empty dealer id".into()));
    }

    let start_cell = cell(Field::ContractStartDate)?;
    if start_cell.is_empty() {
        return Err(malformed(Field::ContractStartDate, "missing date".into()));
    }
    let contract_start_date = parse_date(start_cell).ok_or_else(|| {
        malformed(
            Field::ContractStartDate,
            format!("unparseable date '{}'", start_cell),
        )
    })?;

    let end_cell = cell(Field::ContractEndDate)?;
    let contract_end_date = if end_cell.is_empty() {
        None
    } else {
        Some(parse_date(end_cell).ok_or_else(|| {
            malformed(
                Field::ContractEndDate,
                format!("unparseable date '{}'", end_cell),
            )
        })?)
    };

    let amount_cell = cell(Field::TotalCapitalAmount)?;
    if amount_cell.is_empty() {
        return Err(malformed(Field::TotalCapitalAmount, "missing amount".into()));
    }
    let total_capital_amount = parse_amount(amount_cell).ok_or_else(|| {
        malformed(
            Field::TotalCapitalAmount,
            format!("unparseable amount '{}'", amount_cell),
        )
    })?;
    if total_capital_amount.is_sign_negative() && !total_capital_amount.is_zero() {
        return Err(malformed(
            Field::TotalCapitalAmount,
            format!("negative amount {}", total_capital_amount),
        ));
    }

    let contract_status = cell(Field::ContractStatus)?.to_string();
    let active = options.is_active(&contract_status);

    Ok(ContractRecord {
        country,
        dealer_id: dealer_id.to_string(),
        model_description: optional(Field::ModelDescription)?,
        fuel_type_code: optional(Field::FuelTypeCode)?,
        contract_start_date,
        contract_end_date,
        contract_status,
        active,
        total_capital_amount,
    })
}

fn validation_flags(record: &ContractRecord, today: NaiveDate) -> Vec<ValidationFlag> {
    let mut flags = Vec::new();
    if record
        .contract_end_date
        .is_some_and(|end| end < record.contract_start_date)
    {
        flags.push(ValidationFlag::EndBeforeStart);
    }
    if record.contract_start_date > today {
        flags.push(ValidationFlag::FutureStart);
    }
    flags
}

/// A CSV file on disk tagged with its source country
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub country: Country,
    pub path: PathBuf,
}

/// File-backed loading service
pub struct DataLoaderService {
    sources: Vec<DataSource>,
    options: LoadOptions,
}

impl DataLoaderService {
    pub fn new(sources: Vec<DataSource>, options: LoadOptions) -> Self {
        Self { sources, options }
    }

    /// France then Italy, from the configured paths
    pub fn from_config(config: &Config) -> Self {
        let sources = Country::all()
            .iter()
            .map(|&country| DataSource {
                country,
                path: config.source_path(country).to_path_buf(),
            })
            .collect();
        Self::new(sources, LoadOptions::from_config(config))
    }

    pub fn sources(&self) -> &[DataSource] {
        &self.sources
    }

    /// Open every source and load them into one store.
    ///
    /// All files are checked before any parsing starts.
    pub fn load(&self) -> Result<LoadResult, DataLoadError> {
        let mut readers = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            if !source.path.is_file() {
                return Err(DataLoadError::MissingFile {
                    country: source.country,
                    path: source.path.clone(),
                });
            }
            let file = File::open(&source.path).map_err(|e| DataLoadError::Io {
                path: source.path.clone(),
                source: e,
            })?;
            tracing::debug!(country = %source.country, path = %source.path.display(), "opened source");
            readers.push((source.country, BufReader::new(file)));
        }
        load(readers, &self.options)
    }
}
