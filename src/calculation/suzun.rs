//! Suzun oil treatment unit balance.
//!
//! Computes daily purchase and processing figures from the monthly plan,
//! monthly production sums, the Taymyr/VSLU/SLU stock split of the UPN Suzun
//! tank farm, pumping per license area and pumping losses.

use crate::error::EngineResult;
use crate::models::{CalculationResult, Facility};

use super::{FacilityCalculator, FacilityContext};

/// Calculator for [`Facility::Suzun`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SuzunCalculator;

impl FacilityCalculator for SuzunCalculator {
    fn facility(&self) -> Facility {
        Facility::Suzun
    }

    fn compute(&self, ctx: &FacilityContext<'_>) -> EngineResult<CalculationResult> {
        let mut result = ctx.new_result();
        let n = ctx.days();

        // Daily purchase and outflow from the monthly plan
        let g_buy_day = ctx.month_first("buying_oil") / n;
        let g_out_udt_day = ctx.month_first("out_udt") / n;
        let g_per = g_buy_day - g_out_udt_day;
        result.set("g_buy_day", g_buy_day);
        result.set("g_out_udt_day", g_out_udt_day);
        ctx.set_daily(&mut result, "g_per", g_per);

        result.set("q_vankor_month", ctx.month_sum("gtm_vn"));
        result.set("q_suzun_month", ctx.month_sum("gtm_suzun"));
        result.set("q_vslu_month", ctx.month_sum("gtm_vslu"));
        result.set("q_tng_month", ctx.month_sum("gtm_taymyr"));
        result.set("q_vo_month", ctx.month_sum("gtm_vostok"));

        let g_payaha = ctx.param("G_payaha")?;
        let g_suzun_tng = ctx.param("G_suzun_tng")?;
        let k_g_suzun = ctx.param("K_g_suzun")?;
        let q_vslu_day = ctx.field("gtm_vslu");
        let q_suzun_day = ctx.field("gtm_suzun");

        // Taymyr oil held at UPN Suzun
        let v_suzun_tng = g_payaha + ctx.prev("v_suzun_tng") - g_suzun_tng;
        result.set("v_suzun_tng", v_suzun_tng);

        let g_suzun_vslu = q_vslu_day;
        ctx.set_daily(&mut result, "g_suzun_vslu", g_suzun_vslu);

        let v_upn_suzun_prev = ctx.prev("v_upn_suzun");
        let v_upn_suzun = ctx.manual("V_upn_suzun", v_upn_suzun_prev);
        let v_suzun_vslu = ctx.manual(
            "V_suzun_vslu",
            ctx.prev("v_suzun_vslu") + q_vslu_day - g_suzun_vslu,
        );
        result.set("v_upn_suzun", v_upn_suzun);
        result.set("v_suzun_vslu", v_suzun_vslu);

        let v_suzun_slu_0 = ctx.prev_month("v_upn_suzun")
            - ctx.prev_month("v_suzun_vslu")
            - ctx.prev_month("v_suzun_tng");
        let v_suzun_slu = v_upn_suzun - v_suzun_vslu - v_suzun_tng;
        result.set("v_suzun_slu_0", v_suzun_slu_0);
        result.set("v_suzun_slu", v_suzun_slu);

        let g_suzun_slu =
            q_suzun_day - q_vslu_day - (v_suzun_slu - ctx.prev("v_suzun_slu")) - k_g_suzun;
        ctx.set_daily(&mut result, "g_suzun_slu", g_suzun_slu);

        result.set("g_suzun_tng", g_suzun_tng);
        let g_suzun = g_suzun_vslu + g_suzun_tng + g_suzun_slu;
        ctx.set_daily(&mut result, "g_suzun", g_suzun);

        let g_suzun_delta = q_suzun_day - g_suzun_slu - g_suzun_vslu
            - (v_upn_suzun - v_upn_suzun_prev)
            + g_payaha;
        result.set("g_suzun_delta", g_suzun_delta);

        Ok(result)
    }
}
