//! Read-only access to daily source records.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{DayRecord, MonthKey};

/// The master dataset, indexed by date.
///
/// Built once before a run and never mutated afterwards.
///
/// # Example
///
/// ```
/// use balance_engine::models::DayRecord;
/// use balance_engine::store::RecordStore;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let store = RecordStore::from_records(vec![DayRecord::new(date)]).unwrap();
///
/// assert!(store.get_day(date).is_ok());
/// assert!(store.get_day(date.succ_opt().unwrap()).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: BTreeMap<NaiveDate, DayRecord>,
}

impl RecordStore {
    /// Builds a store.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] when a field is outside the accepted
    ///   input bounds (see [`check_input`](crate::models::check_input))
    /// - [`EngineError::DuplicateRecord`] when two records share a date
    pub fn from_records<I>(records: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = DayRecord>,
    {
        let mut map = BTreeMap::new();
        for record in records {
            record.validate()?;
            let date = record.date;
            if map.insert(date, record).is_some() {
                return Err(EngineError::DuplicateRecord { date });
            }
        }
        Ok(Self { records: map })
    }

    /// Returns the record for `date`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingRecord`] when the dataset has no entry
    /// for that date.
    pub fn get_day(&self, date: NaiveDate) -> EngineResult<&DayRecord> {
        self.records
            .get(&date)
            .ok_or(EngineError::MissingRecord { date })
    }

    /// Returns the records of one calendar month in date order.
    pub fn records_in_month(&self, month: MonthKey) -> Vec<&DayRecord> {
        let Some(first) = NaiveDate::from_ymd_opt(month.year(), month.month(), 1) else {
            return Vec::new();
        };
        self.records
            .range(first..)
            .map(|(_, record)| record)
            .take_while(|record| month.contains(record.date))
            .collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last dates present, if any.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.keys().next()?;
        let last = self.records.keys().next_back()?;
        Some((*first, *last))
    }
}
