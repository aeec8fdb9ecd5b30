//! TSTN trunk pipeline stocks.
//!
//! Covers GNPS pumping, the tank stocks at GNPS, NPS-1, NPS-2 and KNPS, and
//! the split of the trunk pipeline stock between subsoil users. Vankorneft
//! holds whatever is left once every other user's stock is accounted for.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{CalculationResult, Facility};

use super::{FacilityCalculator, FacilityContext};

const PUMP_STATIONS: [(&str, &str); 2] = [("v_nps_1", "V_nps_1"), ("v_nps_2", "V_nps_2")];

/// One subsoil user's share of the trunk pipeline stock.
struct UserStock {
    field: &'static str,
    inflow: Decimal,
    delivery: Decimal,
    loss_percent: Decimal,
}

impl UserStock {
    /// Yesterday's stock plus inflow, less the delivery and its losses.
    fn balance(&self, ctx: &FacilityContext<'_>) -> Decimal {
        ctx.prev(self.field) + self.inflow
            - self.delivery
            - self.delivery * self.loss_percent / Decimal::ONE_HUNDRED
    }
}

/// Calculator for [`Facility::Tstn`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TstnCalculator;

impl FacilityCalculator for TstnCalculator {
    fn facility(&self) -> Facility {
        Facility::Tstn
    }

    fn depends_on(&self) -> &'static [Facility] {
        &[
            Facility::Suzun,
            Facility::Kchng,
            Facility::Lodochny,
            Facility::Sikn1208,
            Facility::RnVankor,
        ]
    }

    fn compute(&self, ctx: &FacilityContext<'_>) -> EngineResult<CalculationResult> {
        let mut result = ctx.new_result();

        let g_sikn = ctx.upstream(Facility::Sikn1208, "g_sikn")?;
        let g_tagul = ctx.upstream(Facility::Lodochny, "g_tagul")?;
        let g_upn_lodochny = ctx.upstream(Facility::Lodochny, "g_upn_lodochny")?;
        let g_sikn_tagul = ctx.upstream(Facility::Lodochny, "g_sikn_tagul")?;
        let g_kchng = ctx.upstream(Facility::Kchng, "g_kchng")?;
        let g_skn = ctx.param("G_skn")?;

        // GNPS: last month's stock above the technological minimum is
        // pumped out evenly over the month
        let vn_min_gnps = ctx.param("VN_min_gnps")?;
        let g_gpns_i = g_sikn + (ctx.prev_month("v_gnps") - vn_min_gnps) / ctx.days();
        let g_gpns_month = ctx.month_to_date("g_gpns_month", g_gpns_i);
        let g_gpns = g_gpns_month / ctx.days();
        result.set("g_gpns_i", g_gpns_i);
        result.set("g_gpns_month", g_gpns_month);
        result.set("g_gpns", g_gpns);

        let v_gnps = ctx.manual("V_gnps", ctx.prev("v_gnps") + g_sikn - g_gpns);
        result.set("v_gnps", v_gnps);

        let mut delta_nps = Decimal::ZERO;
        let mut nps = Decimal::ZERO;
        for (field, manual) in PUMP_STATIONS {
            let previous = ctx.prev(field);
            let stock = ctx.manual(manual, previous);
            result.set(field, stock);
            delta_nps += stock - previous;
            nps += stock;
        }

        let f_knps = ctx.param("F_knps")?;
        let v_knps = ctx.manual(
            "V_knps",
            g_gpns - f_knps + ctx.prev("v_knps") + g_tagul + g_upn_lodochny + g_skn + g_kchng
                - delta_nps,
        );
        result.set("v_knps", v_knps);

        let v_tstn = v_gnps + nps + v_knps;
        result.set("v_tstn", v_tstn);
        let v_tstn_0: Decimal = ["v_gnps", "v_nps_1", "v_nps_2", "v_knps"]
            .iter()
            .map(|field| ctx.prev_month(field))
            .sum();
        result.set("v_tstn_0", v_tstn_0);

        // Per-user stock
        let suzun = |field: &str| ctx.upstream(Facility::Suzun, field);
        let delivery = |block: &str| ctx.upstream(Facility::RnVankor, block);
        let users = [
            UserStock {
                field: "v_tstn_suzun_vslu",
                inflow: suzun("g_suzun_vslu")?,
                delivery: delivery("f_bp_suzun_vslu")?,
                loss_percent: ctx.param("K_suzun")?,
            },
            UserStock {
                field: "v_tstn_suzun_vankor",
                inflow: suzun("g_buy_day")? - suzun("g_per")?,
                delivery: delivery("f_bp_suzun_vankor")?,
                loss_percent: ctx.param("K_vankor")?,
            },
            UserStock {
                field: "v_tstn_suzun",
                inflow: suzun("g_suzun_slu")?,
                delivery: delivery("f_bp_suzun")?,
                loss_percent: ctx.param("K_suzun")?,
            },
            UserStock {
                field: "v_tstn_skn",
                inflow: g_skn,
                delivery: delivery("f_bp_skn")?,
                loss_percent: ctx.param("K_skn")?,
            },
            UserStock {
                field: "v_tstn_vo",
                inflow: ctx.param("G_ichem")?,
                delivery: delivery("f_bp_vo")?,
                loss_percent: ctx.param("K_ichem")?,
            },
            UserStock {
                field: "v_tstn_tng",
                inflow: ctx.param("G_suzun_tng")?,
                delivery: delivery("f_bp_tng")?,
                loss_percent: ctx.param("K_payaha")?,
            },
            UserStock {
                field: "v_tstn_kchng",
                inflow: g_kchng,
                delivery: delivery("f_bp_kchng")?,
                loss_percent: ctx.param("K_tagul")?,
            },
            UserStock {
                field: "v_tstn_tagul",
                inflow: g_tagul,
                delivery: delivery("f_bp_tagul_tpu")?,
                loss_percent: ctx.param("K_tagul")?,
            },
            UserStock {
                field: "v_tstn_lodochny",
                inflow: g_sikn_tagul,
                delivery: delivery("f_bp_tagul_lpu")?,
                loss_percent: ctx.param("K_lodochny")?,
            },
        ];

        let mut others = Decimal::ZERO;
        for user in &users {
            let stock = user.balance(ctx);
            result.set(user.field, stock);
            others += stock;
        }
        result.set(
            "v_tstn_tagul_obsh",
            result.value("v_tstn_tagul") + result.value("v_tstn_lodochny"),
        );

        let v_tstn_rn_vn = ctx.manual("V_tstn_rn_vn", ctx.prev("v_tstn_rn_vn"));
        result.set("v_tstn_rn_vn", v_tstn_rn_vn);
        others += v_tstn_rn_vn;

        result.set("v_tstn_vn", v_tstn - others);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::context::testing::{Fixture, date, dec};

    const USER_STOCKS: [(&str, &str); 10] = [
        ("v_tstn_suzun_vslu", "2400"),
        ("v_tstn_suzun_vankor", "3000"),
        ("v_tstn_suzun", "4100"),
        ("v_tstn_skn", "5200"),
        ("v_tstn_vo", "3300"),
        ("v_tstn_tng", "900"),
        ("v_tstn_kchng", "2700"),
        ("v_tstn_tagul", "7600"),
        ("v_tstn_lodochny", "6400"),
        ("v_tstn_rn_vn", "950"),
    ];

    fn fixture() -> Fixture {
        let mut fixture = Fixture::new(date(2025, 1, 2), vec![])
            .param("G_skn", dec("50"))
            .param("G_ichem", dec("40"))
            .param("G_suzun_tng", dec("80"))
            .param("F_knps", dec("100"))
            .param("K_suzun", dec("1"))
            .prev_month(Facility::Tstn, "v_gnps", dec("5786.761"))
            .prev(Facility::Tstn, "g_gpns_month", dec("18000"))
            .prev(Facility::Tstn, "v_gnps", dec("5200"))
            .prev(Facility::Tstn, "v_nps_1", dec("3100"))
            .prev(Facility::Tstn, "v_nps_2", dec("2900"))
            .prev(Facility::Tstn, "v_knps", dec("6800"))
            .upstream(Facility::Sikn1208, "g_sikn", dec("500"))
            .upstream(Facility::Suzun, "g_suzun_vslu", dec("200"))
            .upstream(Facility::Suzun, "g_buy_day", dec("100"))
            .upstream(Facility::Suzun, "g_per", dec("90"))
            .upstream(Facility::Suzun, "g_suzun_slu", dec("815"))
            .upstream(Facility::Kchng, "g_kchng", dec("400"))
            .upstream(Facility::Lodochny, "g_tagul", dec("990"))
            .upstream(Facility::Lodochny, "g_upn_lodochny", dec("1090"))
            .upstream(Facility::Lodochny, "g_sikn_tagul", dec("60"))
            .upstream(Facility::RnVankor, "f_bp_suzun_vslu", dec("1000"))
            .upstream(Facility::RnVankor, "f_bp_suzun", dec("1000"))
            .upstream(Facility::RnVankor, "f_bp_skn", dec("100"))
            .upstream(Facility::RnVankor, "f_bp_vo", dec("1000"))
            .upstream(Facility::RnVankor, "f_bp_tagul_tpu", dec("2000"))
            .upstream(Facility::RnVankor, "f_bp_tagul_lpu", dec("500"));
        for (field, value) in USER_STOCKS {
            fixture = fixture.prev(Facility::Tstn, field, dec(value));
        }
        fixture
    }

    #[test]
    fn test_gnps_pumping_drains_last_month_surplus() {
        let fixture = fixture();
        let result = TstnCalculator
            .compute(&fixture.context(Facility::Tstn))
            .unwrap();

        assert_eq!(result.value("g_gpns_i"), dec("600"));
        assert_eq!(result.value("g_gpns_month"), dec("18600"));
        assert_eq!(result.value("g_gpns"), dec("600"));
        assert_eq!(result.value("v_gnps"), dec("5100"));
    }

    #[test]
    fn test_pump_station_stocks() {
        let fixture = fixture();
        let result = TstnCalculator
            .compute(&fixture.context(Facility::Tstn))
            .unwrap();

        assert_eq!(result.value("v_nps_1"), dec("3100"));
        assert_eq!(result.value("v_nps_2"), dec("2900"));
        assert_eq!(result.value("v_knps"), dec("9830"));
        assert_eq!(result.value("v_tstn"), dec("20930"));
    }

    #[test]
    fn test_manual_nps_stock_feeds_knps() {
        let fixture = fixture().manual("V_nps_1", dec("3300"));
        let result = TstnCalculator
            .compute(&fixture.context(Facility::Tstn))
            .unwrap();

        assert_eq!(result.value("v_nps_1"), dec("3300"));
        assert_eq!(result.value("v_knps"), dec("9630"));
        assert_eq!(result.value("v_tstn"), dec("20930"));
    }

    #[test]
    fn test_user_stocks_and_vankorneft_residual() {
        let fixture = fixture();
        let result = TstnCalculator
            .compute(&fixture.context(Facility::Tstn))
            .unwrap();

        assert_eq!(result.value("v_tstn_suzun_vslu"), dec("1590"));
        assert_eq!(result.value("v_tstn_suzun_vankor"), dec("3010"));
        assert_eq!(result.value("v_tstn_suzun"), dec("3905"));
        assert_eq!(result.value("v_tstn_skn"), dec("5150"));
        assert_eq!(result.value("v_tstn_vo"), dec("2340"));
        assert_eq!(result.value("v_tstn_tng"), dec("980"));
        assert_eq!(result.value("v_tstn_kchng"), dec("3100"));
        assert_eq!(result.value("v_tstn_tagul"), dec("6590"));
        assert_eq!(result.value("v_tstn_lodochny"), dec("5960"));
        assert_eq!(result.value("v_tstn_tagul_obsh"), dec("12550"));
        assert_eq!(result.value("v_tstn_rn_vn"), dec("950"));

        let users: Decimal = USER_STOCKS
            .iter()
            .map(|(field, _)| result.value(field))
            .sum();
        assert_eq!(result.value("v_tstn_vn") + users, result.value("v_tstn"));
    }
}
