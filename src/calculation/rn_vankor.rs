//! RN-Vankor delivery schedule through SIKN-1209.
//!
//! Every subsoil user's monthly volume is turned into a daily delivery.
//! Large volumes are spread evenly over the month in 50 t steps; small ones
//! are delivered every `e` days, where `e` is the block's configured
//! delivery period. A manual value for `F_bp_<block>` replaces the schedule
//! for that date.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{Alarm, CalculationResult, Facility};

use super::delivery::{even_split, periodic};
use super::{FacilityCalculator, FacilityContext};

/// Alarm raised when the first ten days delivered less than the month's
/// daily average.
pub const FIRST_TEN_DAYS: &str = "FIRST_TEN_DAYS";

/// Deliveries are scheduled in whole multiples of this many tonnes.
const DELIVERY_STEP: u32 = 50;

/// Monthly volumes below this are delivered periodically.
const PERIODIC_THRESHOLD: u32 = 20_000;

/// Fixed VSLU delivery when the VSLU tank is above its norm.
const VSLU_DELIVERY: u32 = 1_000;

const FIRST_DAYS: u32 = 10;

/// Every scheduled block, in the order they add up to `f_bp`.
const BLOCKS: [&str; 10] = [
    "vn",
    "suzun",
    "suzun_vankor",
    "suzun_vslu",
    "tagul_lpu",
    "tagul_tpu",
    "skn",
    "vo",
    "tng",
    "kchng",
];

/// Calculator for [`Facility::RnVankor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RnVankorCalculator;

impl RnVankorCalculator {
    fn scheduled(&self, ctx: &FacilityContext<'_>, block: &str) -> Decimal {
        let step = Decimal::from(DELIVERY_STEP);
        let (days, day) = (ctx.day_count(), ctx.day_of_month());
        let split = |total: Decimal| even_split(total, days, day, step);
        let small_or_split = |total: Decimal| {
            if total < Decimal::from(PERIODIC_THRESHOLD) {
                periodic(total, days, day, ctx.delivery_period(block), step)
            } else {
                split(total)
            }
        };

        match block {
            "vn" => split(ctx.month_first("volume_vankor")),
            "suzun" => split(ctx.month_first("volume_suzun") - ctx.month_first("suzun_vankor")),
            "suzun_vankor" => small_or_split(ctx.month_first("suzun_vankor")),
            "suzun_vslu" => {
                let norm = ctx.field("ctn_suzun_vslu_norm") + Decimal::from(VSLU_DELIVERY);
                if ctx.field("ctn_suzun_vslu") > norm {
                    Decimal::from(VSLU_DELIVERY)
                } else {
                    Decimal::ZERO
                }
            }
            "tagul_lpu" => split(ctx.month_first("volume_lodochny")),
            "tagul_tpu" => split(ctx.month_first("volume_tagulsk")),
            "skn" => split(ctx.field("skn")),
            "vo" => small_or_split(ctx.month_first("volume_vostok_oil")),
            "kchng" => small_or_split(ctx.month_first("volum_kchng")),
            // Taymyr deliveries are not scheduled
            _ => Decimal::ZERO,
        }
    }
}

impl FacilityCalculator for RnVankorCalculator {
    fn facility(&self) -> Facility {
        Facility::RnVankor
    }

    fn compute(&self, ctx: &FacilityContext<'_>) -> EngineResult<CalculationResult> {
        let mut result = ctx.new_result();

        let mut f_bp = Decimal::ZERO;
        for block in BLOCKS {
            let field = format!("f_bp_{}", block);
            let manual = format!("F_bp_{}", block);
            let delivery = ctx.manual(&manual, self.scheduled(ctx, block));
            ctx.set_daily(&mut result, &field, delivery);
            f_bp += delivery;
        }
        ctx.set_daily(&mut result, "f_bp", f_bp);

        let f_bp_sr = result.value("f_bp_month") / ctx.days();
        result.set("f_bp_sr", f_bp_sr);

        let day = ctx.day_of_month();
        let first_days_increment = if day <= FIRST_DAYS { f_bp } else { Decimal::ZERO };
        let f_bp_first10 = ctx.month_to_date("f_bp_first10", first_days_increment);
        result.set("f_bp_first10", f_bp_first10);

        if day >= FIRST_DAYS && f_bp_first10 / Decimal::from(FIRST_DAYS) < f_bp_sr {
            result.raise(Alarm::new(
                FIRST_TEN_DAYS,
                "Delivery over the first ten days is below the monthly daily average",
            ));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::context::testing::{Fixture, date, dec};
    use crate::models::DayRecord;

    fn plan() -> DayRecord {
        DayRecord::new(date(2025, 1, 1))
            .with_field("volume_vankor", dec("31000"))
            .with_field("volume_suzun", dec("40000"))
            .with_field("suzun_vankor", dec("9300"))
            .with_field("volume_lodochny", dec("15500"))
            .with_field("volume_tagulsk", dec("62000"))
            .with_field("volume_vostok_oil", dec("31000"))
            .with_field("volum_kchng", dec("6200"))
    }

    fn fixture(day: u32) -> Fixture {
        let today = DayRecord::new(date(2025, 1, day))
            .with_field("skn", dec("3100"))
            .with_field("ctn_suzun_vslu", dec("3500"))
            .with_field("ctn_suzun_vslu_norm", dec("2000"));
        let records = vec![plan(), today];
        Fixture::new(date(2025, 1, day), records)
    }

    #[test]
    fn test_regular_day_schedule() {
        let fixture = fixture(2)
            .prev(Facility::RnVankor, "f_bp_month", dec("6600"))
            .prev(Facility::RnVankor, "f_bp_first10", dec("6600"));
        let result = RnVankorCalculator
            .compute(&fixture.context(Facility::RnVankor))
            .unwrap();

        assert_eq!(result.value("f_bp_vn"), dec("1000"));
        assert_eq!(result.value("f_bp_suzun"), dec("1000"));
        assert_eq!(result.value("f_bp_suzun_vankor"), Decimal::ZERO);
        assert_eq!(result.value("f_bp_suzun_vslu"), dec("1000"));
        assert_eq!(result.value("f_bp_tagul_lpu"), dec("500"));
        assert_eq!(result.value("f_bp_tagul_tpu"), dec("2000"));
        assert_eq!(result.value("f_bp_skn"), dec("100"));
        assert_eq!(result.value("f_bp_vo"), dec("1000"));
        assert_eq!(result.value("f_bp_tng"), Decimal::ZERO);
        assert_eq!(result.value("f_bp_kchng"), Decimal::ZERO);
        assert_eq!(result.value("f_bp"), dec("6600"));
        assert_eq!(result.value("f_bp_month"), dec("13200"));
        assert_eq!(result.value("f_bp_sr"), dec("13200") / dec("31"));
        assert_eq!(result.value("f_bp_first10"), dec("13200"));
        assert!(result.alarms.is_empty());
    }

    #[test]
    fn test_small_volumes_delivered_periodically() {
        let last_delivery = fixture(28);
        let result = RnVankorCalculator
            .compute(&last_delivery.context(Facility::RnVankor))
            .unwrap();

        // 9300 t over 4 weekly deliveries: 2300 t each, remainder on day 28
        assert_eq!(result.value("f_bp_suzun_vankor"), dec("2400"));
        assert_eq!(result.value("f_bp_kchng"), dec("1550"));

        let second_delivery = fixture(14);
        let result = RnVankorCalculator
            .compute(&second_delivery.context(Facility::RnVankor))
            .unwrap();
        assert_eq!(result.value("f_bp_suzun_vankor"), dec("2300"));
    }

    #[test]
    fn test_configured_delivery_period_is_per_block() {
        let mut fixture = fixture(5);
        fixture.config.delivery_periods.insert("kchng".to_string(), 5);
        let result = RnVankorCalculator
            .compute(&fixture.context(Facility::RnVankor))
            .unwrap();

        // 6 deliveries of 1050 t (1033.3 rounded to 50), suzun_vankor stays weekly
        assert_eq!(result.value("f_bp_kchng"), dec("1050"));
        assert_eq!(result.value("f_bp_suzun_vankor"), Decimal::ZERO);
    }

    #[test]
    fn test_last_two_days_take_remainder() {
        let fixture = Fixture::new(
            date(2025, 1, 30),
            vec![plan().with_field("volume_vankor", dec("31100"))],
        );
        let result = RnVankorCalculator
            .compute(&fixture.context(Facility::RnVankor))
            .unwrap();
        assert_eq!(result.value("f_bp_vn"), dec("1050"));
    }

    #[test]
    fn test_manual_delivery_replaces_schedule() {
        let fixture = fixture(2).manual("F_bp_vn", dec("1500"));
        let result = RnVankorCalculator
            .compute(&fixture.context(Facility::RnVankor))
            .unwrap();

        assert_eq!(result.value("f_bp_vn"), dec("1500"));
        assert_eq!(result.value("f_bp"), dec("7100"));
    }

    #[test]
    fn test_vslu_not_delivered_within_norm() {
        let fixture = fixture(2).manual("ctn_suzun_vslu", dec("3000"));
        let result = RnVankorCalculator
            .compute(&fixture.context(Facility::RnVankor))
            .unwrap();
        assert_eq!(result.value("f_bp_suzun_vslu"), Decimal::ZERO);
    }

    #[test]
    fn test_slow_first_ten_days_raise_alarm() {
        let fixture = fixture(12)
            .prev(Facility::RnVankor, "f_bp_month", dec("200000"))
            .prev(Facility::RnVankor, "f_bp_first10", dec("5000"));
        let result = RnVankorCalculator
            .compute(&fixture.context(Facility::RnVankor))
            .unwrap();

        assert_eq!(result.value("f_bp_first10"), dec("5000"));
        assert_eq!(result.alarms.len(), 1);
        assert_eq!(result.alarms[0].code, FIRST_TEN_DAYS);
    }

    #[test]
    fn test_steady_first_ten_days_no_alarm() {
        let fixture = fixture(12)
            .prev(Facility::RnVankor, "f_bp_month", dec("72600"))
            .prev(Facility::RnVankor, "f_bp_first10", dec("66000"));
        let result = RnVankorCalculator
            .compute(&fixture.context(Facility::RnVankor))
            .unwrap();
        assert!(result.alarms.is_empty());
    }
}
