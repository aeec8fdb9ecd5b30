//! Configuration types for a balance run.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, plus [`RunConfig`], the
//! assembled configuration handed to the pipeline.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{Facility, MAX_INPUT_MAGNITUDE, MAX_INPUT_SCALE};

/// Delivery period used when a block has none configured.
pub const DEFAULT_DELIVERY_PERIOD: u32 = 7;

/// Longest run, in days, accepted when none is configured.
pub const DEFAULT_MAX_RUN_DAYS: u32 = 3660;

/// What the driver does when a date has no source record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRecordPolicy {
    /// Leave a gap in the table and record a failure.
    #[default]
    Skip,
    /// Stop the run at the failing date.
    Abort,
}

/// What the driver does when a computed value fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Fail the date and continue with the next one.
    #[default]
    Skip,
    /// Stop the run at the failing date.
    Abort,
}

/// Which prior row feeds the date after a failed one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryAfterFailure {
    /// The most recent validated row.
    #[default]
    LastValidated,
    /// The "no prior" sentinel, i.e. the opening balances.
    Opening,
}

/// Failure handling for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailurePolicy {
    /// Policy for dates without a source record.
    pub on_missing_record: MissingRecordPolicy,
    /// Policy for values outside their admissible range.
    pub on_out_of_range: OutOfRangePolicy,
    /// Carry-over source after a failed date.
    pub carry_after_failure: CarryAfterFailure,
}

/// Inclusive admissible range of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Lower bound.
    pub min: Decimal,
    /// Upper bound.
    pub max: Decimal,
}

/// Admissible day-over-day movement of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLimit {
    /// Largest allowed decrease.
    pub down: Decimal,
    /// Largest allowed increase.
    pub up: Decimal,
}

/// Validation configuration from validation.yaml.
///
/// Both tables are keyed by qualified `facility.field` names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationTables {
    /// Absolute ranges.
    pub ranges: BTreeMap<String, Range>,
    /// Limits relative to the previous day's value.
    pub daily_change: BTreeMap<String, ChangeLimit>,
}

impl ValidationTables {
    /// Returns the absolute range configured for `key`.
    pub fn range(&self, key: &str) -> Option<&Range> {
        self.ranges.get(key)
    }

    /// Returns the daily-change limit configured for `key`.
    pub fn change_limit(&self, key: &str) -> Option<&ChangeLimit> {
        self.daily_change.get(key)
    }

    fn validate(&self) -> EngineResult<()> {
        for key in self.ranges.keys().chain(self.daily_change.keys()) {
            check_qualified_key(key)?;
        }
        for (key, range) in &self.ranges {
            if range.min > range.max {
                return Err(EngineError::InvalidConfig {
                    key: key.clone(),
                    message: format!("min {} is greater than max {}", range.min, range.max),
                });
            }
        }
        for (key, limit) in &self.daily_change {
            if limit.down.is_sign_negative() || limit.up.is_sign_negative() {
                return Err(EngineError::InvalidConfig {
                    key: key.clone(),
                    message: "daily change limits must not be negative".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Opening balances from opening.yaml.
///
/// These are the values the "no prior" sentinel resolves to, keyed by
/// qualified `facility.field` names. Unlisted fields open at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpeningBalances {
    values: BTreeMap<String, Decimal>,
}

impl OpeningBalances {
    /// Creates opening balances from qualified names.
    pub fn new(values: BTreeMap<String, Decimal>) -> Self {
        Self { values }
    }

    /// Opening value of a facility field.
    pub fn get(&self, facility: Facility, field: &str) -> Decimal {
        self.lookup(facility, field).unwrap_or(Decimal::ZERO)
    }

    /// Opening value of a facility field, if explicitly configured.
    pub fn lookup(&self, facility: Facility, field: &str) -> Option<Decimal> {
        self.values.get(&facility.qualify(field)).copied()
    }

    fn validate(&self) -> EngineResult<()> {
        self.values.iter().try_for_each(|(key, value)| {
            check_qualified_key(key)?;
            check_value_bounds(key, *value)
        })
    }
}

/// Engine settings from engine.yaml.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Display name of the configured cluster.
    pub name: String,
    /// Defaults for scalar parameters, overridable per date.
    pub parameters: BTreeMap<String, Decimal>,
    /// Periodic delivery interval (days) per RN-Vankor block.
    pub delivery_periods: BTreeMap<String, u32>,
    /// Failure handling.
    pub policy: FailurePolicy,
    /// Evaluate independent facilities of a dependency wave in parallel.
    pub parallel_facilities: bool,
    /// Longest accepted run, in days.
    pub max_run_days: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            parameters: BTreeMap::new(),
            delivery_periods: BTreeMap::new(),
            policy: FailurePolicy::default(),
            parallel_facilities: false,
            max_run_days: DEFAULT_MAX_RUN_DAYS,
        }
    }
}

/// The complete configuration for a run.
///
/// # Example
///
/// ```
/// use balance_engine::config::RunConfig;
/// use rust_decimal::Decimal;
///
/// let config = RunConfig::default();
/// assert_eq!(config.parameter("K_otkachki"), Some(Decimal::ZERO));
/// assert_eq!(config.delivery_period("vo"), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Display name of the configured cluster.
    pub name: String,
    /// Defaults for scalar parameters.
    pub parameters: BTreeMap<String, Decimal>,
    /// Periodic delivery interval (days) per RN-Vankor block.
    pub delivery_periods: BTreeMap<String, u32>,
    /// Failure handling.
    pub policy: FailurePolicy,
    /// Evaluate independent facilities of a dependency wave in parallel.
    pub parallel_facilities: bool,
    /// Longest accepted run, in days.
    pub max_run_days: u32,
    /// Range and daily-change tables.
    pub validation: ValidationTables,
    /// Values the first date carries from.
    pub opening: OpeningBalances,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            parameters: default_parameters(),
            delivery_periods: BTreeMap::new(),
            policy: FailurePolicy::default(),
            parallel_facilities: false,
            max_run_days: DEFAULT_MAX_RUN_DAYS,
            validation: ValidationTables::default(),
            opening: OpeningBalances::default(),
        }
    }
}

impl RunConfig {
    /// Assembles a configuration from its files.
    ///
    /// Parameters from `settings` are layered over the built-in defaults.
    pub fn from_parts(
        settings: EngineSettings,
        validation: ValidationTables,
        opening: OpeningBalances,
    ) -> EngineResult<Self> {
        let mut parameters = default_parameters();
        parameters.extend(settings.parameters);

        let config = Self {
            name: settings.name,
            parameters,
            delivery_periods: settings.delivery_periods,
            policy: settings.policy,
            parallel_facilities: settings.parallel_facilities,
            max_run_days: settings.max_run_days,
            validation,
            opening,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_run_days == 0 {
            return Err(EngineError::InvalidConfig {
                key: "max_run_days".to_string(),
                message: "a run must be allowed at least one day".to_string(),
            });
        }
        for (name, value) in &self.parameters {
            check_value_bounds(&format!("parameters.{}", name), *value)?;
        }
        for (block, period) in &self.delivery_periods {
            if *period == 0 {
                return Err(EngineError::InvalidConfig {
                    key: format!("delivery_periods.{}", block),
                    message: "delivery period must be at least one day".to_string(),
                });
            }
        }
        self.validation.validate()?;
        self.opening.validate()
    }

    /// Returns the configured default of a parameter.
    pub fn parameter(&self, name: &str) -> Option<Decimal> {
        self.parameters.get(name).copied()
    }

    /// Delivery period for a block, defaulting to a weekly schedule.
    pub fn delivery_period(&self, block: &str) -> u32 {
        self.delivery_periods
            .get(block)
            .copied()
            .unwrap_or(DEFAULT_DELIVERY_PERIOD)
    }
}

/// Built-in defaults for every scalar parameter the calculators read.
pub fn default_parameters() -> BTreeMap<String, Decimal> {
    const ZERO_DEFAULTS: [&str; 17] = [
        "G_payaha",
        "G_suzun_tng",
        "K_g_suzun",
        "G_ichem",
        "K_otkachki",
        "K_gupn_lodochny",
        "K_g_tagul",
        "K_delta_g_sikn",
        "K_suzun",
        "K_vankor",
        "G_skn",
        "K_skn",
        "K_ichem",
        "K_payaha",
        "K_tagul",
        "K_lodochny",
        "F_knps",
    ];

    let mut parameters: BTreeMap<String, Decimal> = ZERO_DEFAULTS
        .iter()
        .map(|name| (name.to_string(), Decimal::ZERO))
        .collect();
    parameters.insert("VN_min_gnps".to_string(), Decimal::new(2_686_761, 3));
    parameters
}

fn check_qualified_key(key: &str) -> EngineResult<()> {
    let invalid = |message: &str| EngineError::InvalidConfig {
        key: key.to_string(),
        message: message.to_string(),
    };
    let (facility, field) = key
        .split_once('.')
        .ok_or_else(|| invalid("expected 'facility.field'"))?;
    if field.is_empty() {
        return Err(invalid("field name is empty"));
    }
    Facility::from_str(facility).map_err(|_| invalid("unknown facility"))?;
    Ok(())
}

fn check_value_bounds(key: &str, value: Decimal) -> EngineResult<()> {
    if value.abs() > MAX_INPUT_MAGNITUDE || value.normalize().scale() > MAX_INPUT_SCALE {
        return Err(EngineError::InvalidConfig {
            key: key.to_string(),
            message: format!("value {} is outside the accepted input bounds", value),
        });
    }
    Ok(())
}
