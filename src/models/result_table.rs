//! Result table and run report models.
//!
//! The [`ResultTable`] is the append-only, date-ordered output of a run. Dates
//! that failed are absent from it and listed as [`DayFailure`] entries in the
//! [`RunReport`] instead.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DayRow;
use crate::error::{EngineError, EngineResult};

/// Ordered sequence of validated day rows.
///
/// Rows are strictly ascending by date; gaps appear only where a date was
/// skipped.
///
/// # Example
///
/// ```
/// use balance_engine::models::{DayRow, ResultTable};
/// use chrono::NaiveDate;
///
/// let mut table = ResultTable::new();
/// table.push(DayRow::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())).unwrap();
/// table.push(DayRow::new(NaiveDate::from_ymd_opt(2025, 1, 3).unwrap())).unwrap();
///
/// // Going backwards is rejected.
/// assert!(table.push(DayRow::new(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap())).is_err());
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<DayRow>,
}

impl ResultTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row whose date is after the last row's date.
    pub fn push(&mut self, row: DayRow) -> EngineResult<()> {
        if let Some(last) = self.rows.last() {
            if row.date <= last.date {
                return Err(EngineError::CalculationError {
                    message: format!(
                        "row for {} does not follow last row {}",
                        row.date, last.date
                    ),
                });
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// All rows in date order.
    pub fn rows(&self) -> &[DayRow] {
        &self.rows
    }

    /// The most recent row.
    pub fn last(&self) -> Option<&DayRow> {
        self.rows.last()
    }

    /// Finds the row for a date.
    pub fn get(&self, date: NaiveDate) -> Option<&DayRow> {
        self.rows
            .binary_search_by_key(&date, |row| row.date)
            .ok()
            .map(|index| &self.rows[index])
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when no rows were produced.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A date that could not be validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFailure {
    /// The failed date.
    pub date: NaiveDate,
    /// The error code (see [`EngineError::code`]).
    pub code: String,
    /// Human-readable description of the failure.
    pub message: String,
    /// The qualified field that failed validation, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl DayFailure {
    /// Builds a failure entry from an engine error.
    pub fn from_error(date: NaiveDate, error: &EngineError) -> Self {
        let field = match error {
            EngineError::OutOfRange { field, .. } => Some(field.clone()),
            _ => None,
        };
        Self {
            date,
            code: error.code().to_string(),
            message: error.to_string(),
            field,
        }
    }
}

/// Summary counters for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// First requested date.
    pub start_date: NaiveDate,
    /// Last requested date (inclusive).
    pub end_date: NaiveDate,
    /// Dates that were attempted.
    pub days_processed: usize,
    /// Dates that produced a validated row.
    pub days_validated: usize,
    /// Dates that failed.
    pub days_failed: usize,
    /// True when the run stopped early under the abort policy.
    pub aborted: bool,
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run counters.
    pub summary: RunSummary,
    /// Validated rows.
    pub table: ResultTable,
    /// Failed dates, in date order.
    pub failures: Vec<DayFailure>,
}
