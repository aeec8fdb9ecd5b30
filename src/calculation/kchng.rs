//! KCHNG (Russko-Rechenskoye field) production and pumping.

use crate::error::EngineResult;
use crate::models::{CalculationResult, Facility};

use super::{FacilityCalculator, FacilityContext};

/// Calculator for [`Facility::Kchng`].
///
/// Daily pumping equals the day's production; the month-to-date total
/// continues the previous day's total.
#[derive(Debug, Clone, Copy, Default)]
pub struct KchngCalculator;

impl FacilityCalculator for KchngCalculator {
    fn facility(&self) -> Facility {
        Facility::Kchng
    }

    fn compute(&self, ctx: &FacilityContext<'_>) -> EngineResult<CalculationResult> {
        let mut result = ctx.new_result();
        result.set("q_kchng_month", ctx.month_sum("kchng"));
        ctx.set_daily(&mut result, "g_kchng", ctx.field("kchng"));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::context::testing::{Fixture, date, dec};
    use crate::models::DayRecord;
    use rust_decimal::Decimal;

    fn records() -> Vec<DayRecord> {
        vec![
            DayRecord::new(date(2025, 1, 1)).with_field("kchng", dec("400")),
            DayRecord::new(date(2025, 1, 2)).with_field("kchng", dec("410")),
            DayRecord::new(date(2025, 1, 3)).with_field("kchng", dec("420")),
        ]
    }

    #[test]
    fn test_first_day_starts_from_sentinel() {
        let fixture = Fixture::new(date(2025, 1, 1), records());
        let result = KchngCalculator
            .compute(&fixture.context(Facility::Kchng))
            .unwrap();

        assert_eq!(result.value("q_kchng_month"), dec("1230"));
        assert_eq!(result.value("g_kchng"), dec("400"));
        assert_eq!(result.value("g_kchng_month"), dec("400"));
    }

    #[test]
    fn test_cumulative_adds_today_to_yesterday() {
        let fixture = Fixture::new(date(2025, 1, 2), records())
            .prev(Facility::Kchng, "g_kchng_month", dec("400"));
        let result = KchngCalculator
            .compute(&fixture.context(Facility::Kchng))
            .unwrap();
        assert_eq!(result.value("g_kchng_month"), dec("810"));
    }

    #[test]
    fn test_override_replaces_measured_value() {
        let fixture = Fixture::new(date(2025, 1, 2), records())
            .prev(Facility::Kchng, "g_kchng_month", dec("400"))
            .manual("kchng", dec("500"));
        let result = KchngCalculator
            .compute(&fixture.context(Facility::Kchng))
            .unwrap();

        assert_eq!(result.value("g_kchng"), dec("500"));
        assert_eq!(result.value("g_kchng_month"), dec("900"));
    }

    #[test]
    fn test_missing_field_reads_zero() {
        let day = date(2025, 1, 4);
        let fixture = Fixture::new(day, vec![DayRecord::new(day)]);
        let result = KchngCalculator
            .compute(&fixture.context(Facility::Kchng))
            .unwrap();
        assert_eq!(result.value("g_kchng"), Decimal::ZERO);
    }
}
