//! Lodochny field and Tagul license area balance.
//!
//! Splits Lodochny production between UPSV-Yu and UPN Lodochny using the
//! pumping coefficient derived from last month's totals, schedules the daily
//! SIKN Tagul delivery, and balances the Tagul tank stock.

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::{Alarm, CalculationResult, Facility, MAX_INPUT_MAGNITUDE};

use super::delivery::even_split;
use super::{FacilityCalculator, FacilityContext};

/// Alarm raised when the configured pumping coefficient disagrees with the
/// one derived from last month's totals.
pub const PUMPING_COEFFICIENT_MISMATCH: &str = "PUMPING_COEFFICIENT_MISMATCH";

/// Calculator for [`Facility::Lodochny`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LodochnyCalculator;

impl FacilityCalculator for LodochnyCalculator {
    fn facility(&self) -> Facility {
        Facility::Lodochny
    }

    fn depends_on(&self) -> &'static [Facility] {
        &[Facility::Kchng]
    }

    fn compute(&self, ctx: &FacilityContext<'_>) -> EngineResult<CalculationResult> {
        let mut result = ctx.new_result();

        let g_ichem = ctx.param("G_ichem")?;
        let k_otkachki = ctx.param("K_otkachki")?;
        let k_gupn = ctx.param("K_gupn_lodochny")?;
        let k_g_tagul = ctx.param("K_g_tagul")?;
        let half_k_gupn = k_gupn / Decimal::TWO;

        let q_tagul_day = ctx.field("gtm_tagulsk");
        let q_lodochny_day = ctx.field("gtm_lodochny");
        let q_vo_day = ctx.field("gtm_vostok");

        result.set("q_tagul_month", ctx.month_sum("gtm_tagulsk"));
        result.set("q_lodochny_month", ctx.month_sum("gtm_lodochny"));

        // Stocks
        let v_upn_prev = ctx.prev("v_upn_lodochny");
        let v_upn = ctx.manual("V_upn_lodochny", v_upn_prev);
        let v_ichem = ctx.prev("v_ichem") + ctx.field("lodochny_ichem") - g_ichem;
        result.set("v_upn_lodochny", v_upn);
        result.set("v_ichem", v_ichem);
        result.set("v_lodochny", v_upn - v_ichem);

        // Pumping coefficient from last month
        let upsv_prev_month = ctx.manual(
            "G_lodochny_upsv_yu_prev_month",
            ctx.prev_month("g_lodochny_uspv_yu_month"),
        );
        let q_tagul_prev_month = ctx.manual("Q_tagul_prev_month", ctx.prev_month("q_tagul_month"));
        let k = if q_tagul_prev_month.is_zero() {
            warn!(
                date = %ctx.date,
                k_otkachki = %k_otkachki,
                "last month's Tagul production is zero, using configured pumping coefficient"
            );
            k_otkachki
        } else {
            // Bounded like an input so the daily products stay representable.
            upsv_prev_month
                .checked_div(q_tagul_prev_month)
                .filter(|k| k.abs() <= MAX_INPUT_MAGNITUDE)
                .ok_or_else(|| EngineError::CalculationError {
                    message: format!(
                        "pumping coefficient {} / {} is out of bounds",
                        upsv_prev_month, q_tagul_prev_month
                    ),
                })?
        };
        if (k_otkachki - k).abs() >= Decimal::new(1, 2) {
            result.raise(Alarm::new(
                PUMPING_COEFFICIENT_MISMATCH,
                format!(
                    "Configured pumping coefficient {} differs from derived {}; using derived",
                    k_otkachki, k
                ),
            ));
        }
        result.set("k_otkachki_month", k);

        let g_lodochny_uspv_yu = q_lodochny_day * (Decimal::ONE - k) - half_k_gupn;
        ctx.set_daily(&mut result, "g_lodochny_uspv_yu", g_lodochny_uspv_yu);

        // SIKN Tagul schedule: rounded to 10 t, remainder over the last two days
        let upsv_month = result.value("g_lodochny_uspv_yu_month");
        let scheduled = even_split(
            upsv_month,
            ctx.day_count(),
            ctx.day_of_month(),
            Decimal::TEN,
        );
        let g_sikn_tagul = ctx.manual("G_sikn_tagul", scheduled);
        ctx.set_daily(&mut result, "g_sikn_tagul", g_sikn_tagul);

        // Tagul
        let v_tagul_prev = ctx.prev("v_tagul");
        let v_tagul = ctx.manual("V_tagul", v_tagul_prev);
        let delta_v_tagul = v_tagul - v_tagul_prev;
        let g_tagul = q_tagul_day - delta_v_tagul - k_g_tagul;
        result.set("v_tagul", v_tagul);
        ctx.set_daily(&mut result, "g_tagul", g_tagul);
        ctx.set_daily(
            &mut result,
            "delta_g_tagul",
            q_tagul_day - g_tagul - delta_v_tagul,
        );

        // UPN Lodochny
        let delta_v_upn = v_upn - v_upn_prev;
        let g_upn_lodochny = q_lodochny_day * k - delta_v_upn - half_k_gupn + q_vo_day;
        let g_lodochny = g_upn_lodochny - g_ichem;
        ctx.set_daily(&mut result, "g_upn_lodochny", g_upn_lodochny);
        ctx.set_daily(&mut result, "g_lodochny", g_lodochny);
        ctx.set_daily(
            &mut result,
            "delta_g_upn_lodochny",
            q_lodochny_day + q_vo_day - g_lodochny_uspv_yu - g_lodochny - delta_v_upn,
        );

        let g_kchng = ctx.upstream(Facility::Kchng, "g_kchng")?;
        ctx.set_daily(
            &mut result,
            "g_tagul_lodochny",
            g_tagul + g_upn_lodochny + g_kchng,
        );

        Ok(result)
    }
}
