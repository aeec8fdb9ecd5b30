//! Builds the JSON report from a run.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::calculation::{FIRST_TEN_DAYS, PUMPING_COEFFICIENT_MISMATCH};
use crate::config::ValidationTables;
use crate::error::{EngineError, EngineResult};
use crate::models::{DayRow, MonthKey, RunReport};

use super::types::{BalanceReport, DayEntry, ReportValue, STATUS_OK, StatusValue};

const MONTH_SUFFIX: &str = "_month";

/// Alarm codes that always appear in [`BalanceReport::checks`].
const CONTROL_CHECKS: [&str; 2] = [FIRST_TEN_DAYS, PUMPING_COEFFICIENT_MISMATCH];

/// Turns a [`RunReport`] into a [`BalanceReport`].
#[derive(Debug, Clone, Copy)]
pub struct ReportBuilder<'a> {
    tables: &'a ValidationTables,
}

impl<'a> ReportBuilder<'a> {
    /// Creates a builder; fields covered by `tables` are reported with status.
    pub fn new(tables: &'a ValidationTables) -> Self {
        Self { tables }
    }

    /// Builds the report.
    pub fn build(&self, run: &RunReport) -> BalanceReport {
        let rows = run.table.rows();
        let month = rows.last().map(|row| MonthKey::from_date(row.date));
        let month_rows: Vec<&DayRow> = match month {
            Some(month) => rows.iter().filter(|row| month.contains(row.date)).collect(),
            None => Vec::new(),
        };

        BalanceReport {
            summary: run.summary.clone(),
            month,
            monthly_totals: monthly_totals(&month_rows),
            checks: checks(rows),
            days: rows.iter().map(|row| self.day_entry(row)).collect(),
            failures: run.failures.clone(),
        }
    }

    /// Builds the report and serializes it as pretty-printed JSON.
    pub fn to_json(&self, run: &RunReport) -> EngineResult<String> {
        serde_json::to_string_pretty(&self.build(run)).map_err(|e| EngineError::CalculationError {
            message: format!("failed to serialize report: {}", e),
        })
    }

    fn day_entry(&self, row: &DayRow) -> DayEntry {
        let mut fields = BTreeMap::new();
        let mut alarms = BTreeMap::new();
        for (facility, result) in &row.facilities {
            for (field, value) in &result.fields {
                let key = facility.qualify(field);
                let checked =
                    self.tables.range(&key).is_some() || self.tables.change_limit(&key).is_some();
                let value = if checked {
                    ReportValue::Checked(StatusValue::ok(*value))
                } else {
                    ReportValue::Plain(*value)
                };
                fields.insert(key, value);
            }
            for alarm in &result.alarms {
                alarms.insert(
                    facility.qualify(&alarm.code),
                    StatusValue::alarm(None, alarm.message.clone()),
                );
            }
        }
        DayEntry {
            date: row.date,
            fields,
            alarms,
        }
    }
}

/// Closing `*_month` values and sums of their daily counterparts.
fn monthly_totals(month_rows: &[&DayRow]) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    let Some(last) = month_rows.last() else {
        return totals;
    };

    for (facility, result) in &last.facilities {
        for (field, value) in &result.fields {
            let Some(daily) = field.strip_suffix(MONTH_SUFFIX) else {
                continue;
            };
            totals.insert(facility.qualify(field), *value);
            if daily.is_empty() {
                continue;
            }
            let sum: Decimal = month_rows
                .iter()
                .filter_map(|row| row.facility(*facility))
                .filter_map(|result| result.get(daily))
                .sum();
            if result.get(daily).is_some() {
                totals.insert(facility.qualify(daily), sum);
            }
        }
    }
    totals
}

/// Whole-run status of every control check.
fn checks(rows: &[DayRow]) -> BTreeMap<String, StatusValue> {
    let mut checks: BTreeMap<String, StatusValue> = CONTROL_CHECKS
        .iter()
        .map(|code| (code.to_string(), StatusValue::clear()))
        .collect();

    for row in rows {
        for (_, alarm) in row.alarms() {
            let entry = checks
                .entry(alarm.code.clone())
                .or_insert_with(StatusValue::clear);
            if entry.status == STATUS_OK {
                *entry = StatusValue::alarm(None, format!("{}: {}", row.date, alarm.message));
            }
        }
    }
    checks
}
