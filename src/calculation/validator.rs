//! Admissible-range validation of computed values.

use rust_decimal::Decimal;

use super::context::Carry;
use crate::config::ValidationTables;
use crate::error::{EngineError, EngineResult};
use crate::models::CalculationResult;

/// Checks `value` against the inclusive range `[min, max]`.
///
/// # Example
///
/// ```
/// use balance_engine::calculation::check;
/// use rust_decimal::Decimal;
///
/// let (min, max) = (Decimal::from(900), Decimal::from(4000));
/// assert!(check(Decimal::from(900), min, max, "tstn.v_tstn_suzun_vslu").is_ok());
/// assert!(check(Decimal::from(4001), min, max, "tstn.v_tstn_suzun_vslu").is_err());
/// ```
pub fn check(value: Decimal, min: Decimal, max: Decimal, field: &str) -> EngineResult<Decimal> {
    if value < min || value > max {
        return Err(EngineError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// Applies the configured range and daily-change tables to results.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    tables: &'a ValidationTables,
}

impl<'a> Validator<'a> {
    /// Creates a validator over `tables`.
    pub fn new(tables: &'a ValidationTables) -> Self {
        Self { tables }
    }

    /// Validates every configured field of `result`.
    ///
    /// Fields are visited in name order and the first violation is returned.
    /// A daily-change limit is only applied when the carry holds a value for
    /// the field.
    pub fn validate(&self, result: &CalculationResult, previous: &Carry<'_>) -> EngineResult<()> {
        for (field, value) in &result.fields {
            let key = result.facility.qualify(field);

            if let Some(range) = self.tables.range(&key) {
                check(*value, range.min, range.max, &key)?;
            }

            if let Some(limit) = self.tables.change_limit(&key) {
                if let Some(prior) = previous.lookup(result.facility, field) {
                    check(*value, prior - limit.down, prior + limit.up, &key)?;
                }
            }
        }
        Ok(())
    }
}
