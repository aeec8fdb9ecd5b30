//! JSON report over a finished run.
//!
//! The report lists every validated date with its outputs, marks fields
//! covered by a validation table with a status object, totals the last
//! processed month, and summarizes the control checks.

mod builder;
mod types;

pub use builder::ReportBuilder;
pub use types::{
    BalanceReport, DayEntry, ReportValue, STATUS_ALARM, STATUS_OK, Status, StatusValue,
};
