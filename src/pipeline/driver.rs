//! The daily pipeline driver.
//!
//! Processes dates in ascending order. Each date gets its context built,
//! every facility computed wave by wave, and every configured check applied
//! before the row enters the result table. Failed dates leave a gap and a
//! failure entry; the configured [`FailurePolicy`] decides whether the run
//! continues and what the next date carries from.

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::calculation::{CalculationPlan, Carry, FacilityCalculator, FacilityContext, Validator};
use crate::config::{
    CarryAfterFailure, FailurePolicy, MissingRecordPolicy, OutOfRangePolicy, RunConfig,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalculationResult, DayFailure, DayRecord, DayRow, MonthKey, ResultTable, RunReport,
    RunSummary,
};
use crate::store::{MonthlyContextCache, Override, OverrideResolver, RecordStore};

use super::state::{DayProgress, DayState};

/// Runs the facility calculators over a date range.
///
/// The pipeline owns its configuration and calculation plan; every call to
/// [`run`](Self::run) starts from fresh stores, so runs are independent and
/// deterministic.
///
/// # Example
///
/// ```
/// use balance_engine::config::RunConfig;
/// use balance_engine::models::DayRecord;
/// use balance_engine::pipeline::BalancePipeline;
/// use chrono::NaiveDate;
///
/// let pipeline = BalancePipeline::new(RunConfig::default()).unwrap();
/// let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let report = pipeline.run(vec![DayRecord::new(day)], vec![], day, day).unwrap();
/// assert_eq!(report.summary.days_validated, 1);
/// ```
#[derive(Debug)]
pub struct BalancePipeline {
    config: RunConfig,
    plan: CalculationPlan,
}

/// Inputs shared by every date of one run.
struct RunInputs<'a> {
    store: &'a RecordStore,
    cache: MonthlyContextCache<'a>,
    overrides: OverrideResolver,
}

/// What a failed date means for the rest of the run.
enum FailureAction {
    Continue,
    Abort,
}

impl BalancePipeline {
    /// Creates a pipeline over the standard calculation plan.
    pub fn new(config: RunConfig) -> EngineResult<Self> {
        Self::with_plan(config, CalculationPlan::standard()?)
    }

    /// Creates a pipeline over a custom calculation plan.
    pub fn with_plan(config: RunConfig, plan: CalculationPlan) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config, plan })
    }

    /// Returns the run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Processes every date from `start` to `end` inclusive.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidRange`] when `start` is after `end`
    /// - [`EngineError::RangeTooLong`] when the range covers more than
    ///   [`RunConfig::max_run_days`] dates
    /// - [`EngineError::InvalidInput`] when a record or override value is
    ///   outside the accepted input bounds
    /// - [`EngineError::DuplicateRecord`] when two records share a date
    /// - any error that is not a data problem of a single date, such as
    ///   [`EngineError::MissingOverrideDefault`]
    ///
    /// Missing records and out-of-range values are reported per date in
    /// [`RunReport::failures`] instead.
    pub fn run<R, O>(
        &self,
        records: R,
        overrides: O,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<RunReport>
    where
        R: IntoIterator<Item = DayRecord>,
        O: IntoIterator<Item = Override>,
    {
        if start > end {
            return Err(EngineError::InvalidRange { start, end });
        }
        let max_days = self.config.max_run_days;
        if (end - start).num_days() >= i64::from(max_days) {
            return Err(EngineError::RangeTooLong {
                start,
                end,
                max_days,
            });
        }

        let store = RecordStore::from_records(records)?;
        let mut resolver = OverrideResolver::with_defaults(self.config.parameters.clone());
        resolver.extend(overrides)?;
        let inputs = RunInputs {
            store: &store,
            cache: MonthlyContextCache::new(&store),
            overrides: resolver,
        };

        info!(
            config = %self.config.name,
            start = %start,
            end = %end,
            records = store.len(),
            overrides = inputs.overrides.len(),
            parallel = self.config.parallel_facilities,
            "Starting balance run"
        );

        let policy = self.config.policy;
        let mut table = ResultTable::new();
        let mut failures = Vec::new();
        let mut carry: Option<DayRow> = None;
        let mut month_closing: HashMap<MonthKey, DayRow> = HashMap::new();
        let mut days_processed = 0;
        let mut aborted = false;

        for date in start.iter_days().take_while(|date| *date <= end) {
            days_processed += 1;
            let mut progress = DayProgress::new(date);
            let closing = month_closing.get(&MonthKey::from_date(date).previous());

            match self.process_day(date, &inputs, carry.as_ref(), closing, &mut progress) {
                Ok(row) => {
                    for (facility, alarm) in row.alarms() {
                        info!(date = %date, facility = %facility, code = %alarm.code, "Alarm raised");
                    }
                    month_closing.insert(MonthKey::from_date(date), row.clone());
                    table.push(row.clone())?;
                    carry = Some(row);
                }
                Err(error) => {
                    let reached = progress.state();
                    progress.fail(&error);
                    let action = failure_action(&policy, &error)?;
                    warn!(
                        date = %date,
                        state = %reached,
                        code = error.code(),
                        error = %error,
                        "Date failed"
                    );
                    failures.push(DayFailure::from_error(date, &error));
                    if policy.carry_after_failure == CarryAfterFailure::Opening {
                        carry = None;
                    }
                    if let FailureAction::Abort = action {
                        aborted = true;
                        break;
                    }
                }
            }
        }

        let summary = RunSummary {
            start_date: start,
            end_date: end,
            days_processed,
            days_validated: table.len(),
            days_failed: failures.len(),
            aborted,
        };
        info!(
            config = %self.config.name,
            days_processed = summary.days_processed,
            days_validated = summary.days_validated,
            days_failed = summary.days_failed,
            aborted = summary.aborted,
            months_cached = inputs.cache.len(),
            "Balance run finished"
        );

        Ok(RunReport {
            summary,
            table,
            failures,
        })
    }

    fn process_day(
        &self,
        date: NaiveDate,
        inputs: &RunInputs<'_>,
        carry: Option<&DayRow>,
        closing: Option<&DayRow>,
        progress: &mut DayProgress,
    ) -> EngineResult<DayRow> {
        let today = inputs.store.get_day(date)?;
        let month = inputs.cache.get(MonthKey::from_date(date));
        let previous_day = carry.map_or(Carry::NoPrior(&self.config.opening), Carry::Prior);
        let previous_month = closing.map_or(Carry::NoPrior(&self.config.opening), Carry::Prior);
        progress.advance(DayState::ContextBuilt)?;

        let mut row = DayRow::new(date);
        for wave in self.plan.waves() {
            let compute = |calculator: &Box<dyn FacilityCalculator>| {
                let ctx = FacilityContext {
                    date,
                    facility: calculator.facility(),
                    today,
                    month: &month,
                    previous_day,
                    previous_month,
                    upstream: &row,
                    overrides: &inputs.overrides,
                    config: &self.config,
                };
                calculator.compute(&ctx)
            };
            let results: Vec<CalculationResult> = if self.config.parallel_facilities {
                wave.par_iter().map(compute).collect::<EngineResult<_>>()?
            } else {
                wave.iter().map(compute).collect::<EngineResult<_>>()?
            };
            for result in results {
                row.insert(result);
            }
        }
        progress.advance(DayState::Computed)?;

        let validator = Validator::new(&self.config.validation);
        for result in row.facilities.values() {
            validator.validate(result, &previous_day)?;
        }
        progress.advance(DayState::Validated)?;
        debug!(date = %date, facilities = row.facilities.len(), "Date validated");

        Ok(row)
    }
}

/// Decides how a failed date affects the run.
///
/// Errors that are not data problems of one date are returned as-is.
fn failure_action(policy: &FailurePolicy, error: &EngineError) -> EngineResult<FailureAction> {
    match error {
        EngineError::MissingRecord { .. } => Ok(match policy.on_missing_record {
            MissingRecordPolicy::Skip => FailureAction::Continue,
            MissingRecordPolicy::Abort => FailureAction::Abort,
        }),
        EngineError::OutOfRange { .. } => Ok(match policy.on_out_of_range {
            OutOfRangePolicy::Skip => FailureAction::Continue,
            OutOfRangePolicy::Abort => FailureAction::Abort,
        }),
        other => Err(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Range, ValidationTables};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn kchng_records(days: &[(u32, &str)]) -> Vec<DayRecord> {
        days.iter()
            .map(|(day, kchng)| DayRecord::new(jan(*day)).with_field("kchng", dec(kchng)))
            .collect()
    }

    fn kchng_range(max: &str) -> RunConfig {
        let mut validation = ValidationTables::default();
        validation.ranges.insert(
            "kchng.g_kchng".to_string(),
            Range {
                min: Decimal::ZERO,
                max: dec(max),
            },
        );
        RunConfig {
            validation,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let pipeline = BalancePipeline::new(RunConfig::default()).unwrap();
        let result = pipeline.run(vec![], vec![], jan(3), jan(1));
        assert_eq!(
            result.unwrap_err(),
            EngineError::InvalidRange {
                start: jan(3),
                end: jan(1)
            }
        );
    }

    #[test]
    fn test_range_longer_than_limit_is_rejected() {
        let pipeline = BalancePipeline::new(RunConfig {
            max_run_days: 3,
            ..RunConfig::default()
        })
        .unwrap();

        assert!(pipeline.run(vec![], vec![], jan(1), jan(3)).is_ok());
        assert_eq!(
            pipeline.run(vec![], vec![], jan(1), jan(4)).unwrap_err(),
            EngineError::RangeTooLong {
                start: jan(1),
                end: jan(4),
                max_days: 3,
            }
        );
    }

    #[test]
    fn test_oversized_override_is_rejected_before_calculation() {
        let pipeline = BalancePipeline::new(RunConfig::default()).unwrap();
        let result = pipeline.run(
            kchng_records(&[(1, "400")]),
            vec![Override {
                parameter: "K_otkachki".to_string(),
                date: jan(1),
                value: Decimal::MAX,
            }],
            jan(1),
            jan(1),
        );
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_every_facility_in_every_row() {
        let pipeline = BalancePipeline::new(RunConfig::default()).unwrap();
        let records = kchng_records(&[(1, "400"), (2, "410")]);
        let report = pipeline.run(records, vec![], jan(1), jan(2)).unwrap();

        assert_eq!(report.table.len(), 2);
        for row in report.table.rows() {
            assert_eq!(row.facilities.len(), 8);
        }
    }

    #[test]
    fn test_missing_record_is_skipped_by_default() {
        let pipeline = BalancePipeline::new(RunConfig::default()).unwrap();
        let records = kchng_records(&[(1, "400"), (3, "420")]);
        let report = pipeline.run(records, vec![], jan(1), jan(3)).unwrap();

        assert_eq!(report.summary.days_processed, 3);
        assert_eq!(report.summary.days_validated, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].code, "MISSING_RECORD");
        assert!(report.table.get(jan(2)).is_none());
        // Day 3 continues from day 1
        let day3 = report.table.get(jan(3)).unwrap();
        assert_eq!(
            day3.value(crate::models::Facility::Kchng, "g_kchng_month"),
            dec("820")
        );
    }

    #[test]
    fn test_missing_record_abort_stops_run() {
        let mut config = RunConfig::default();
        config.policy.on_missing_record = MissingRecordPolicy::Abort;
        let pipeline = BalancePipeline::new(config).unwrap();
        let records = kchng_records(&[(1, "400"), (3, "420")]);
        let report = pipeline.run(records, vec![], jan(1), jan(3)).unwrap();

        assert!(report.summary.aborted);
        assert_eq!(report.summary.days_processed, 2);
        assert_eq!(report.table.len(), 1);
        assert_eq!(report.failures[0].date, jan(2));
    }

    #[test]
    fn test_out_of_range_fails_only_that_date() {
        let pipeline = BalancePipeline::new(kchng_range("500")).unwrap();
        let records = kchng_records(&[(1, "400"), (2, "900"), (3, "420")]);
        let report = pipeline.run(records, vec![], jan(1), jan(3)).unwrap();

        assert_eq!(report.summary.days_validated, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].field.as_deref(), Some("kchng.g_kchng"));
        assert!(report.table.get(jan(2)).is_none());
    }

    #[test]
    fn test_carry_after_failure_opening_restarts_totals() {
        let mut config = kchng_range("500");
        config.policy.carry_after_failure = CarryAfterFailure::Opening;
        let pipeline = BalancePipeline::new(config).unwrap();
        let records = kchng_records(&[(1, "400"), (2, "900"), (3, "420")]);
        let report = pipeline.run(records, vec![], jan(1), jan(3)).unwrap();

        let day3 = report.table.get(jan(3)).unwrap();
        assert_eq!(
            day3.value(crate::models::Facility::Kchng, "g_kchng_month"),
            dec("420")
        );
    }

    #[test]
    fn test_parallel_waves_match_sequential() {
        let records = kchng_records(&[(1, "400"), (2, "410"), (3, "420")]);
        let sequential = BalancePipeline::new(RunConfig::default())
            .unwrap()
            .run(records.clone(), vec![], jan(1), jan(3))
            .unwrap();
        let parallel = BalancePipeline::new(RunConfig {
            parallel_facilities: true,
            ..RunConfig::default()
        })
        .unwrap()
        .run(records, vec![], jan(1), jan(3))
        .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_missing_parameter_default_aborts_with_error() {
        let mut config = RunConfig::default();
        config.parameters.remove("G_ichem");
        let pipeline = BalancePipeline::new(config).unwrap();
        let result = pipeline.run(kchng_records(&[(1, "400")]), vec![], jan(1), jan(1));
        assert_eq!(
            result.unwrap_err(),
            EngineError::MissingOverrideDefault {
                parameter: "G_ichem".to_string()
            }
        );
    }
}
