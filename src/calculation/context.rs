//! Per-facility calculation context.
//!
//! A [`FacilityContext`] bundles everything one calculator may read for one
//! date: today's record, the month's aggregate, carried-over results,
//! same-day upstream results and override access. Calculators never see the
//! record store or the result table directly.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::config::{OpeningBalances, RunConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{CalculationResult, DayRecord, DayRow, Facility};
use crate::store::{MonthlyAggregate, OverrideResolver};

/// A carried-over row, or the explicit "no prior" sentinel.
///
/// The sentinel resolves every field to its configured opening balance,
/// which is zero unless configured.
#[derive(Debug, Clone, Copy)]
pub enum Carry<'a> {
    /// A validated row from an earlier date.
    Prior(&'a DayRow),
    /// No usable prior row; read opening balances instead.
    NoPrior(&'a OpeningBalances),
}

impl<'a> Carry<'a> {
    /// The carried value of a facility field.
    pub fn value(&self, facility: Facility, field: &str) -> Decimal {
        match self {
            Carry::Prior(row) => row.value(facility, field),
            Carry::NoPrior(opening) => opening.get(facility, field),
        }
    }

    /// The carried value, if one actually exists.
    ///
    /// Opening balances only count when explicitly configured.
    pub fn lookup(&self, facility: Facility, field: &str) -> Option<Decimal> {
        match self {
            Carry::Prior(row) => row.facility(facility).and_then(|result| result.get(field)),
            Carry::NoPrior(opening) => opening.lookup(facility, field),
        }
    }

    /// Returns true for the "no prior" sentinel.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Carry::NoPrior(_))
    }
}

/// Everything a calculator may read for one date.
#[derive(Debug, Clone, Copy)]
pub struct FacilityContext<'a> {
    /// The date being computed.
    pub date: NaiveDate,
    /// The facility being computed.
    pub facility: Facility,
    /// Today's source record.
    pub today: &'a DayRecord,
    /// The aggregate of the month containing `date`.
    pub month: &'a MonthlyAggregate,
    /// Yesterday's carried row.
    pub previous_day: Carry<'a>,
    /// Last validated row of the previous calendar month.
    pub previous_month: Carry<'a>,
    /// Same-date results of facilities computed in earlier waves.
    pub upstream: &'a DayRow,
    /// Manual value lookup.
    pub overrides: &'a OverrideResolver,
    /// Run configuration.
    pub config: &'a RunConfig,
}

impl<'a> FacilityContext<'a> {
    /// Starts an empty result for this facility and date.
    pub fn new_result(&self) -> CalculationResult {
        CalculationResult::new(self.facility, self.date)
    }

    /// Today's value of a raw field, with any override for the date applied.
    pub fn field(&self, name: &str) -> Decimal {
        self.overrides
            .resolve(name, self.date, self.today.value(name))
    }

    /// Sum of a raw field over the month.
    pub fn month_sum(&self, name: &str) -> Decimal {
        self.month.sum(name)
    }

    /// Monthly plan value, read from the month's first record.
    pub fn month_first(&self, name: &str) -> Decimal {
        self.month.first(name)
    }

    /// Yesterday's value of one of this facility's fields.
    pub fn prev(&self, field: &str) -> Decimal {
        self.previous_day.value(self.facility, field)
    }

    /// Yesterday's value of another facility's field.
    pub fn prev_of(&self, facility: Facility, field: &str) -> Decimal {
        self.previous_day.value(facility, field)
    }

    /// Previous month's closing value of one of this facility's fields.
    pub fn prev_month(&self, field: &str) -> Decimal {
        self.previous_month.value(self.facility, field)
    }

    /// Month-to-date accumulation of `field` including `today`.
    ///
    /// Continues yesterday's total when the carried row is in the same month,
    /// restarts at `today` in a new month, and starts from the opening balance
    /// under the sentinel.
    pub fn month_to_date(&self, field: &str, today: Decimal) -> Decimal {
        match self.previous_day {
            Carry::Prior(row) if self.month.month().contains(row.date) => {
                row.value(self.facility, field) + today
            }
            Carry::Prior(_) => today,
            Carry::NoPrior(opening) => opening.get(self.facility, field) + today,
        }
    }

    /// Sets a daily field and its `<name>_month` running total.
    pub fn set_daily(&self, result: &mut CalculationResult, name: &str, today: Decimal) {
        let month_field = format!("{}_month", name);
        let month_value = self.month_to_date(&month_field, today);
        result.set(name, today);
        result.set(month_field, month_value);
    }

    /// A same-date output of an upstream facility.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingUpstream`] when that facility has not
    /// been computed for this date.
    pub fn upstream(&self, facility: Facility, field: &str) -> EngineResult<Decimal> {
        self.upstream
            .facility(facility)
            .map(|result| result.value(field))
            .ok_or_else(|| EngineError::MissingUpstream {
                facility: self.facility.to_string(),
                upstream: facility.to_string(),
            })
    }

    /// A manual value for the date, else `default`.
    pub fn manual(&self, parameter: &str, default: Decimal) -> Decimal {
        self.overrides.resolve(parameter, self.date, default)
    }

    /// A scalar parameter, from overrides or the configured defaults.
    pub fn param(&self, name: &str) -> EngineResult<Decimal> {
        self.overrides.resolve_configured(name, self.date)
    }

    /// Calendar length of the month (`N`).
    pub fn day_count(&self) -> u32 {
        self.month.day_count()
    }

    /// `N` as a decimal.
    pub fn days(&self) -> Decimal {
        Decimal::from(self.day_count())
    }

    /// Day of the month, 1-indexed.
    pub fn day_of_month(&self) -> u32 {
        self.date.day()
    }

    /// Periodic delivery interval for an RN-Vankor block.
    pub fn delivery_period(&self, block: &str) -> u32 {
        self.config.delivery_period(block)
    }
}
