//! JSON report document types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{DayFailure, MonthKey, RunSummary};

/// Status of a checked value: `0` passed, `1` needs attention.
pub type Status = u8;

/// Status code for a value that passed its checks.
pub const STATUS_OK: Status = 0;

/// Status code for a raised alarm or failed check.
pub const STATUS_ALARM: Status = 1;

/// A value with its check outcome.
///
/// # Example
///
/// ```
/// use balance_engine::report::StatusValue;
/// use rust_decimal::Decimal;
///
/// let value = StatusValue::ok(Decimal::from(5000));
/// let json = serde_json::to_string(&value).unwrap();
/// assert_eq!(json, r#"{"value":"5000","status":0,"message":""}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusValue {
    /// The value, when there is one.
    pub value: Option<Decimal>,
    /// [`STATUS_OK`] or [`STATUS_ALARM`].
    pub status: Status,
    /// Explanation for a non-zero status.
    pub message: String,
}

impl StatusValue {
    /// A value that passed its checks.
    pub fn ok(value: Decimal) -> Self {
        Self {
            value: Some(value),
            status: STATUS_OK,
            message: String::new(),
        }
    }

    /// A check with no value that has not fired.
    pub fn clear() -> Self {
        Self {
            value: None,
            status: STATUS_OK,
            message: String::new(),
        }
    }

    /// A raised alarm.
    pub fn alarm(value: Option<Decimal>, message: impl Into<String>) -> Self {
        Self {
            value,
            status: STATUS_ALARM,
            message: message.into(),
        }
    }
}

/// A field in a day entry: plain, or with a check outcome when the field is
/// covered by a validation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportValue {
    /// A validated field.
    Checked(StatusValue),
    /// An unchecked field.
    Plain(Decimal),
}

/// One validated date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    /// The date.
    pub date: NaiveDate,
    /// Every output, keyed by `facility.field`.
    pub fields: BTreeMap<String, ReportValue>,
    /// Alarms raised on this date, keyed by `facility.code`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub alarms: BTreeMap<String, StatusValue>,
}

/// The report document for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// Run counters.
    pub summary: RunSummary,
    /// The month the totals cover: the month of the last validated date.
    pub month: Option<MonthKey>,
    /// Closing month-to-date values and sums of daily fields over `month`,
    /// keyed by `facility.field`.
    pub monthly_totals: BTreeMap<String, Decimal>,
    /// Control checks over the whole run, keyed by alarm code.
    pub checks: BTreeMap<String, StatusValue>,
    /// Validated dates in ascending order.
    pub days: Vec<DayEntry>,
    /// Dates that produced no row.
    pub failures: Vec<DayFailure>,
}
