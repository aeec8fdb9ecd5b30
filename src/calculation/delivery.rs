//! Daily delivery schedules.
//!
//! Monthly volumes are scheduled as daily amounts rounded to a step. The
//! rounding loss is absorbed by the last days so that a full month of
//! scheduled amounts adds back up to the monthly volume exactly.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds `value` to the nearest multiple of `step`, ties to even.
///
/// # Example
///
/// ```
/// use balance_engine::calculation::delivery::round_to_step;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_to_step(Decimal::from(1274), Decimal::from(50)), Decimal::from(1250));
/// assert_eq!(round_to_step(Decimal::from(1275), Decimal::from(50)), Decimal::from(1300));
/// assert_eq!(round_to_step(Decimal::from(1225), Decimal::from(50)), Decimal::from(1200));
/// ```
pub fn round_to_step(value: Decimal, step: Decimal) -> Decimal {
    if step.is_zero() {
        return value;
    }
    (value / step).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven) * step
}

/// Amount scheduled on `day` when `total` is spread over every day of an
/// `days`-long month.
///
/// Days up to `days - 2` get the rounded daily average; the last two days
/// share what is left.
pub fn even_split(total: Decimal, days: u32, day: u32, step: Decimal) -> Decimal {
    if days == 0 {
        return Decimal::ZERO;
    }
    let base = round_to_step(total / Decimal::from(days), step);
    let regular_days = days.saturating_sub(2);
    if day <= regular_days {
        base
    } else {
        (total - base * Decimal::from(regular_days)) / Decimal::TWO
    }
}

/// Amount scheduled on `day` when `total` is delivered every `period` days.
///
/// Delivery days are the multiples of `period` within the month. The last
/// delivery day takes the remainder; every other day gets nothing. A period
/// longer than the month schedules nothing.
pub fn periodic(total: Decimal, days: u32, day: u32, period: u32, step: Decimal) -> Decimal {
    if period == 0 {
        return Decimal::ZERO;
    }
    let deliveries = days / period;
    if deliveries == 0 || day % period != 0 || day > days {
        return Decimal::ZERO;
    }
    let base = round_to_step(total / Decimal::from(deliveries), step);
    if day == deliveries * period {
        total - base * Decimal::from(deliveries - 1)
    } else {
        base
    }
}
