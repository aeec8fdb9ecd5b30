//! Vostok Oil (Ichem license area) pumping to UPN Lodochny.

use crate::error::EngineResult;
use crate::models::{CalculationResult, Facility};

use super::{FacilityCalculator, FacilityContext};

/// Calculator for [`Facility::VostokOil`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VostokOilCalculator;

impl FacilityCalculator for VostokOilCalculator {
    fn facility(&self) -> Facility {
        Facility::VostokOil
    }

    fn compute(&self, ctx: &FacilityContext<'_>) -> EngineResult<CalculationResult> {
        let mut result = ctx.new_result();
        ctx.set_daily(&mut result, "g_upn_lod", ctx.field("gtm_vostok"));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::context::testing::{Fixture, date, dec};
    use crate::models::DayRecord;

    #[test]
    fn test_pumping_follows_daily_production() {
        let day = date(2025, 3, 5);
        let fixture = Fixture::new(
            day,
            vec![DayRecord::new(day).with_field("gtm_vostok", dec("640.5"))],
        )
        .prev(Facility::VostokOil, "g_upn_lod_month", dec("2500"));

        let result = VostokOilCalculator
            .compute(&fixture.context(Facility::VostokOil))
            .unwrap();
        assert_eq!(result.value("g_upn_lod"), dec("640.5"));
        assert_eq!(result.value("g_upn_lod_month"), dec("3140.5"));
    }
}
