//! Daily source records and calendar month keys.
//!
//! This module contains the [`DayRecord`] type holding one day of measured
//! quantities and the [`MonthKey`] type used to group records by month.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Largest accepted magnitude of a source or manual value (10^12).
pub const MAX_INPUT_MAGNITUDE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Most significant decimal places accepted in a source or manual value.
pub const MAX_INPUT_SCALE: u32 = 6;

/// Checks one input value against [`MAX_INPUT_MAGNITUDE`] and
/// [`MAX_INPUT_SCALE`].
///
/// Inputs inside these bounds keep every month of daily arithmetic well
/// inside the `Decimal` range.
///
/// # Example
///
/// ```
/// use balance_engine::models::check_input;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// assert!(check_input(day, "kchng", Decimal::new(4105, 1)).is_ok());
/// assert!(check_input(day, "kchng", Decimal::MAX).is_err());
/// ```
pub fn check_input(date: NaiveDate, field: &str, value: Decimal) -> EngineResult<()> {
    if value.abs() > MAX_INPUT_MAGNITUDE || value.normalize().scale() > MAX_INPUT_SCALE {
        return Err(EngineError::InvalidInput {
            date,
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// One day of measured quantities from the master dataset.
///
/// Field names are stable across the dataset (for example `gtm_vn`,
/// `buying_oil`, `upsv_yu`); a field absent from a record reads as zero.
///
/// # Example
///
/// ```
/// use balance_engine::models::DayRecord;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let record = DayRecord::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
///     .with_field("kchng", Decimal::from(420));
///
/// assert_eq!(record.get("kchng"), Some(Decimal::from(420)));
/// assert_eq!(record.value("gtm_vn"), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    /// The date the measurements belong to.
    pub date: NaiveDate,
    /// Named measured quantities.
    #[serde(default)]
    pub fields: BTreeMap<String, Decimal>,
}

impl DayRecord {
    /// Creates an empty record for the given date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field, returning the updated record.
    pub fn with_field(mut self, name: impl Into<String>, value: Decimal) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.fields.get(name).copied()
    }

    /// Returns the value of a field, or zero when absent.
    pub fn value(&self, name: &str) -> Decimal {
        self.get(name).unwrap_or(Decimal::ZERO)
    }

    /// Checks every field with [`check_input`], in name order.
    pub fn validate(&self) -> EngineResult<()> {
        self.fields
            .iter()
            .try_for_each(|(name, value)| check_input(self.date, name, *value))
    }

    /// Returns the month this record belongs to.
    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

/// A calendar month, used to key monthly aggregates.
///
/// # Example
///
/// ```
/// use balance_engine::models::MonthKey;
///
/// let feb = MonthKey::new(2024, 2).unwrap();
/// assert_eq!(feb.day_count(), 29);
/// assert_eq!(feb.previous(), MonthKey::new(2024, 1).unwrap());
/// assert!(MonthKey::new(2024, 13).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Creates a month key, returning `None` when `month` is not in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Returns the month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The calendar month (1-indexed).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of days in this month, accounting for leap years.
    pub fn day_count(&self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(self.year) => 29,
            2 => 28,
            _ => 31,
        }
    }

    /// The month before this one.
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Returns true if `date` falls in this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
