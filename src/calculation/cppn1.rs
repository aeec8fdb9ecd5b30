//! CPPN-1 central oil treatment point stocks.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{CalculationResult, Facility};

use super::{FacilityCalculator, FacilityContext};

const UPSV_TANKS: [(&str, &str); 3] = [
    ("v_upsv_yu", "V_upsv_yu"),
    ("v_upsv_s", "V_upsv_s"),
    ("v_upsv_cps", "V_upsv_cps"),
];

/// Calculator for [`Facility::Cppn1`].
///
/// Tank stocks carry over unless entered manually; the Lodochny oil held in
/// UPSV-Yu/CPS tanks grows with receipts and shrinks with SIKN Tagul
/// deliveries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cppn1Calculator;

impl FacilityCalculator for Cppn1Calculator {
    fn facility(&self) -> Facility {
        Facility::Cppn1
    }

    fn depends_on(&self) -> &'static [Facility] {
        &[Facility::Lodochny]
    }

    fn compute(&self, ctx: &FacilityContext<'_>) -> EngineResult<CalculationResult> {
        let mut result = ctx.new_result();

        let mut v_cppn_1 = Decimal::ZERO;
        let mut v_cppn_1_0 = Decimal::ZERO;
        for (field, manual) in UPSV_TANKS {
            let stock = ctx.manual(manual, ctx.prev(field));
            result.set(field, stock);
            v_cppn_1 += stock;
            v_cppn_1_0 += ctx.prev_month(field);
        }
        result.set("v_cppn_1", v_cppn_1);
        result.set("v_cppn_1_0", v_cppn_1_0);

        let g_sikn_tagul = ctx.upstream(Facility::Lodochny, "g_sikn_tagul")?;
        result.set(
            "v_lodochny_cps_upsv_yu",
            ctx.prev("v_lodochny_cps_upsv_yu") + ctx.field("lodochny_upsv_yu") - g_sikn_tagul,
        );

        Ok(result)
    }
}
