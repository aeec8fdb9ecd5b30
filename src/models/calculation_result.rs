//! Calculation result models for the balance engine.
//!
//! This module contains the [`CalculationResult`] type produced by each
//! facility calculator, the [`Alarm`] notices a calculator may raise, and the
//! [`DayRow`] that groups every facility's result for one date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Facility;

/// A non-fatal control-condition notice raised by a calculator.
///
/// Alarms do not fail a date; they travel with the result and are rendered
/// as status objects in the exported report.
///
/// # Example
///
/// ```
/// use balance_engine::models::Alarm;
///
/// let alarm = Alarm::new("FIRST_TEN_DAYS", "Deliveries lag the monthly average");
/// assert_eq!(alarm.code, "FIRST_TEN_DAYS");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    /// A code identifying the kind of alarm.
    pub code: String,
    /// A human-readable description.
    pub message: String,
}

impl Alarm {
    /// Creates an alarm from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The computed output fields of one facility for one date.
///
/// Field names are local to the facility (for example `g_kchng_month` in the
/// `kchng` namespace). Reading an unset field through [`value`](Self::value)
/// yields zero.
///
/// # Example
///
/// ```
/// use balance_engine::models::{CalculationResult, Facility};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let mut result = CalculationResult::new(
///     Facility::Kchng,
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
/// );
/// result.set("g_kchng", Decimal::from(420));
///
/// assert_eq!(result.get("g_kchng"), Some(Decimal::from(420)));
/// assert_eq!(result.value("g_kchng_month"), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// The facility this result belongs to.
    pub facility: Facility,
    /// The date the result was computed for.
    pub date: NaiveDate,
    /// Named computed values.
    pub fields: BTreeMap<String, Decimal>,
    /// Alarms raised while computing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alarms: Vec<Alarm>,
}

impl CalculationResult {
    /// Creates an empty result.
    pub fn new(facility: Facility, date: NaiveDate) -> Self {
        Self {
            facility,
            date,
            fields: BTreeMap::new(),
            alarms: Vec::new(),
        }
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Decimal) {
        self.fields.insert(name.into(), value);
    }

    /// Returns the value of a field, if it was computed.
    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.fields.get(name).copied()
    }

    /// Returns the value of a field, or zero when it was not computed.
    pub fn value(&self, name: &str) -> Decimal {
        self.get(name).unwrap_or(Decimal::ZERO)
    }

    /// Records an alarm.
    pub fn raise(&mut self, alarm: Alarm) {
        self.alarms.push(alarm);
    }
}

/// Every facility's result for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRow {
    /// The date of the row.
    pub date: NaiveDate,
    /// Results keyed by facility.
    pub facilities: BTreeMap<Facility, CalculationResult>,
}

impl DayRow {
    /// Creates an empty row.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            facilities: BTreeMap::new(),
        }
    }

    /// Returns the result of a facility, if present.
    pub fn facility(&self, facility: Facility) -> Option<&CalculationResult> {
        self.facilities.get(&facility)
    }

    /// Returns a facility field, or zero when either is absent.
    pub fn value(&self, facility: Facility, field: &str) -> Decimal {
        self.facility(facility)
            .map(|result| result.value(field))
            .unwrap_or(Decimal::ZERO)
    }

    /// Inserts a facility result.
    pub fn insert(&mut self, result: CalculationResult) {
        self.facilities.insert(result.facility, result);
    }

    /// Iterates over every alarm in the row, tagged with its facility.
    pub fn alarms(&self) -> impl Iterator<Item = (Facility, &Alarm)> {
        self.facilities
            .values()
            .flat_map(|result| result.alarms.iter().map(move |alarm| (result.facility, alarm)))
    }
}
