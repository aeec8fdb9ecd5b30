//! SIKN-1208 metering station pumping by license area.

use crate::error::EngineResult;
use crate::models::{CalculationResult, Facility};

use super::{FacilityCalculator, FacilityContext};

/// Calculator for [`Facility::Sikn1208`].
///
/// Total pumping through SIKN-1208 is Vankor production plus Suzun and
/// UPSV-Yu pumping, corrected for the CPPN-1 stock change. The Vankorneft
/// share is what remains after Tagul, Suzun and Taymyr.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sikn1208Calculator;

impl FacilityCalculator for Sikn1208Calculator {
    fn facility(&self) -> Facility {
        Facility::Sikn1208
    }

    fn depends_on(&self) -> &'static [Facility] {
        &[Facility::Suzun, Facility::Lodochny, Facility::Cppn1]
    }

    fn compute(&self, ctx: &FacilityContext<'_>) -> EngineResult<CalculationResult> {
        let mut result = ctx.new_result();

        let g_suzun = ctx.upstream(Facility::Suzun, "g_suzun")?;
        let g_suzun_vslu = ctx.upstream(Facility::Suzun, "g_suzun_vslu")?;
        let g_buy_day = ctx.upstream(Facility::Suzun, "g_buy_day")?;
        let g_per = ctx.upstream(Facility::Suzun, "g_per")?;
        let g_lodochny_uspv_yu = ctx.upstream(Facility::Lodochny, "g_lodochny_uspv_yu")?;
        let g_sikn_tagul = ctx.upstream(Facility::Lodochny, "g_sikn_tagul")?;
        let v_cppn_1 = ctx.upstream(Facility::Cppn1, "v_cppn_1")?;
        let delta_v_cppn_1 = v_cppn_1 - ctx.prev_of(Facility::Cppn1, "v_cppn_1");

        let g_suzun_tng = ctx.param("G_suzun_tng")?;
        let k_delta_g_sikn = ctx.param("K_delta_g_sikn")?;
        let q_vankor = ctx.field("gtm_vn");

        ctx.set_daily(&mut result, "g_sikn_vslu", g_suzun_vslu);
        ctx.set_daily(&mut result, "g_sikn_tagul", g_sikn_tagul);

        let g_sikn_suzun = g_suzun + g_buy_day - g_per;
        ctx.set_daily(&mut result, "g_sikn_suzun", g_sikn_suzun);
        ctx.set_daily(&mut result, "g_sikn_tng", g_suzun_tng);

        let g_sikn = q_vankor + g_suzun - delta_v_cppn_1
            + g_lodochny_uspv_yu
            + k_delta_g_sikn
            + g_buy_day
            + g_per;
        ctx.set_daily(&mut result, "g_sikn", g_sikn);
        ctx.set_daily(
            &mut result,
            "g_sikn_vankor",
            g_sikn - g_sikn_tagul - g_sikn_suzun - g_suzun_tng,
        );

        result.set("g_skn_month", ctx.month_sum("skn_data"));

        let g_delta_sikn = q_vankor + g_suzun + g_lodochny_uspv_yu - g_sikn
            - delta_v_cppn_1
            + g_buy_day
            - g_per;
        result.set("g_delta_sikn", g_delta_sikn);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::context::testing::{Fixture, date, dec};
    use crate::error::EngineError;
    use crate::models::DayRecord;

    fn fixture() -> Fixture {
        let records = vec![
            DayRecord::new(date(2025, 1, 1)).with_field("skn_data", dec("300")),
            DayRecord::new(date(2025, 1, 2))
                .with_field("gtm_vn", dec("10000"))
                .with_field("skn_data", dec("320")),
        ];
        Fixture::new(date(2025, 1, 2), records)
            .param("G_suzun_tng", dec("80"))
            .param("K_delta_g_sikn", dec("5"))
            .upstream(Facility::Suzun, "g_suzun", dec("1095"))
            .upstream(Facility::Suzun, "g_suzun_vslu", dec("200"))
            .upstream(Facility::Suzun, "g_buy_day", dec("100"))
            .upstream(Facility::Suzun, "g_per", dec("90"))
            .upstream(Facility::Lodochny, "g_lodochny_uspv_yu", dec("990"))
            .upstream(Facility::Lodochny, "g_sikn_tagul", dec("60"))
            .upstream(Facility::Cppn1, "v_cppn_1", dec("18800"))
            .prev(Facility::Cppn1, "v_cppn_1", dec("18700"))
            .prev(Facility::Sikn1208, "g_sikn_month", dec("12000"))
    }

    #[test]
    fn test_pumping_split_by_license_area() {
        let fixture = fixture();
        let result = Sikn1208Calculator
            .compute(&fixture.context(Facility::Sikn1208))
            .unwrap();

        assert_eq!(result.value("g_sikn_vslu"), dec("200"));
        assert_eq!(result.value("g_sikn_tagul"), dec("60"));
        assert_eq!(result.value("g_sikn_suzun"), dec("1105"));
        assert_eq!(result.value("g_sikn_tng"), dec("80"));
        assert_eq!(result.value("g_sikn"), dec("12180"));
        assert_eq!(result.value("g_sikn_month"), dec("24180"));
        assert_eq!(result.value("g_sikn_vankor"), dec("10935"));
        assert_eq!(result.value("g_skn_month"), dec("620"));
        assert_eq!(result.value("g_delta_sikn"), dec("-185"));
    }

    #[test]
    fn test_cppn_stock_growth_reduces_pumping() {
        let fixture = fixture().upstream(Facility::Cppn1, "v_cppn_1", dec("19000"));
        let result = Sikn1208Calculator
            .compute(&fixture.context(Facility::Sikn1208))
            .unwrap();
        assert_eq!(result.value("g_sikn"), dec("11980"));
    }

    #[test]
    fn test_requires_cppn_result() {
        let day = date(2025, 1, 2);
        let fixture = Fixture::new(day, vec![])
            .upstream_empty(Facility::Suzun)
            .upstream_empty(Facility::Lodochny);
        let error = Sikn1208Calculator
            .compute(&fixture.context(Facility::Sikn1208))
            .unwrap_err();
        assert_eq!(
            error,
            EngineError::MissingUpstream {
                facility: "sikn_1208".to_string(),
                upstream: "cppn_1".to_string(),
            }
        );
    }
}
