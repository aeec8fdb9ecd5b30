//! Manually supplied values keyed by parameter and date.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::check_input;

/// One manual value as supplied by an operator or an API request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    /// The parameter or raw field name.
    pub parameter: String,
    /// The date the value applies to.
    pub date: NaiveDate,
    /// The value.
    pub value: Decimal,
}

/// Looks up manual values, falling back to defaults.
///
/// Lookups never fail for an explicit default. Parameters resolved through
/// [`resolve_configured`](Self::resolve_configured) must have an entry in the
/// defaults table.
///
/// # Example
///
/// ```
/// use balance_engine::store::OverrideResolver;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
/// let mut resolver = OverrideResolver::default();
/// resolver.insert("V_upn_suzun", day, Decimal::from(5200));
///
/// assert_eq!(resolver.resolve("V_upn_suzun", day, Decimal::ZERO), Decimal::from(5200));
/// assert_eq!(
///     resolver.resolve("V_upn_suzun", day.succ_opt().unwrap(), Decimal::ONE),
///     Decimal::ONE
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct OverrideResolver {
    values: HashMap<(String, NaiveDate), Decimal>,
    defaults: BTreeMap<String, Decimal>,
}

impl OverrideResolver {
    /// Creates a resolver with a per-parameter defaults table.
    pub fn with_defaults(defaults: BTreeMap<String, Decimal>) -> Self {
        Self {
            values: HashMap::new(),
            defaults,
        }
    }

    /// Adds every override from `overrides`, later entries winning.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for a value outside the accepted
    /// input bounds; entries before it stay stored.
    pub fn extend<I>(&mut self, overrides: I) -> EngineResult<()>
    where
        I: IntoIterator<Item = Override>,
    {
        for entry in overrides {
            check_input(entry.date, &entry.parameter, entry.value)?;
            self.insert(entry.parameter, entry.date, entry.value);
        }
        Ok(())
    }

    /// Sets the configured default of a parameter.
    pub fn set_default(&mut self, parameter: impl Into<String>, value: Decimal) {
        self.defaults.insert(parameter.into(), value);
    }

    /// Stores a value for `(parameter, date)`.
    pub fn insert(&mut self, parameter: impl Into<String>, date: NaiveDate, value: Decimal) {
        self.values.insert((parameter.into(), date), value);
    }

    /// Returns the stored value for the pair, if any.
    pub fn lookup(&self, parameter: &str, date: NaiveDate) -> Option<Decimal> {
        self.values.get(&(parameter.to_string(), date)).copied()
    }

    /// Returns the stored value for the pair, else `default`.
    pub fn resolve(&self, parameter: &str, date: NaiveDate, default: Decimal) -> Decimal {
        match self.lookup(parameter, date) {
            Some(value) => value,
            None => {
                debug!(parameter, %date, %default, "used default");
                default
            }
        }
    }

    /// Resolves against the configured defaults table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingOverrideDefault`] when the parameter has
    /// no stored value for the date and no configured default.
    pub fn resolve_configured(&self, parameter: &str, date: NaiveDate) -> EngineResult<Decimal> {
        if let Some(value) = self.lookup(parameter, date) {
            return Ok(value);
        }
        let default = self.defaults.get(parameter).copied().ok_or_else(|| {
            EngineError::MissingOverrideDefault {
                parameter: parameter.to_string(),
            }
        })?;
        debug!(parameter, %date, %default, "used default");
        Ok(default)
    }

    /// Number of stored overrides.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no overrides are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
