//! Contract CSV schema resolution
//!
//! Header cells are normalized before matching, so `Contract_Status`,
//! `CONTRACTSTATUS` and `contract status` all resolve to the same column.

use std::collections::HashMap;
use std::str::{self, Utf8Error};

use crate::types::{Country, DataLoadError, Field};

/// Normalize a header cell for matching.
///
/// Transformations:
/// - Strip UTF-8 BOM and surrounding whitespace
/// - Lowercase
/// - Drop `_`, `-` and inner spaces
///
/// # Examples
/// ```
/// use dealerdash::services::schema::normalize_header;
///
/// assert_eq!(normalize_header("\u{feff}ContractStartDate"), "contractstartdate");
/// assert_eq!(normalize_header(" contract_status "), "contractstatus");
/// ```
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Map a normalized header to a schema field
fn field_for(normalized: &str) -> Option<Field> {
    Field::all()
        .iter()
        .copied()
        .find(|f| normalize_header(f.header()) == normalized)
}

/// Column index of every schema field in one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: HashMap<Field, usize>,
}

impl ColumnMap {
    /// Resolve header cells against the schema.
    ///
    /// Fails on the first missing field (in schema order) or on two
    /// headers that normalize to the same field. Extra columns are ignored.
    pub fn resolve<'h, I>(headers: I, country: Country) -> Result<Self, DataLoadError>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let mut indices: HashMap<Field, usize> = HashMap::new();
        let mut originals: HashMap<Field, &'h str> = HashMap::new();

        for (idx, header) in headers.into_iter().enumerate() {
            let Some(field) = field_for(&normalize_header(header)) else {
                continue;
            };
            if let Some(first) = originals.get(&field) {
                return Err(DataLoadError::AmbiguousColumn {
                    country,
                    field,
                    first: (*first).to_string(),
                    second: header.to_string(),
                });
            }
            originals.insert(field, header);
            indices.insert(field, idx);
        }

        if let Some(missing) = Field::all().iter().find(|f| !indices.contains_key(f)) {
            return Err(DataLoadError::MissingColumn {
                country,
                field: *missing,
            });
        }

        Ok(Self { indices })
    }

    /// Column index for a field (always present after `resolve`)
    pub fn index(&self, field: Field) -> usize {
        self.indices[&field]
    }

    /// Trimmed cell for a field; missing trailing cells read as empty.
    ///
    /// Cells are decoded per field, so a non-UTF-8 byte only fails the
    /// field it sits in.
    pub fn cell<'r>(
        &self,
        record: &'r csv::ByteRecord,
        field: Field,
    ) -> Result<&'r str, Utf8Error> {
        match record.get(self.index(field)) {
            Some(bytes) => str::from_utf8(bytes).map(str::trim),
            None => Ok(""),
        }
    }
}
