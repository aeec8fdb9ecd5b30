//! Error types for the balance engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while running the daily pipeline.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the balance engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use balance_engine::error::EngineError;
/// use chrono::NaiveDate;
///
/// let error = EngineError::MissingRecord {
///     date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
/// };
/// assert_eq!(error.to_string(), "No source record for 2025-01-02");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration was parsed but is not usable.
    #[error("Invalid configuration '{key}': {message}")]
    InvalidConfig {
        /// The offending configuration key.
        key: String,
        /// What is wrong with it.
        message: String,
    },

    /// The requested run range is empty or reversed.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange {
        /// First date of the range.
        start: NaiveDate,
        /// Last date of the range.
        end: NaiveDate,
    },

    /// The requested run range spans more dates than the configuration allows.
    #[error("Date range {start} to {end} spans more than {max_days} days")]
    RangeTooLong {
        /// First date of the range.
        start: NaiveDate,
        /// Last date of the range.
        end: NaiveDate,
        /// Configured maximum number of dates per run.
        max_days: u32,
    },

    /// A source or manual value exceeds the accepted magnitude or precision.
    #[error("Value {value} of '{field}' on {date} is outside the accepted input bounds")]
    InvalidInput {
        /// The date the value belongs to.
        date: NaiveDate,
        /// The record field or parameter name.
        field: String,
        /// The rejected value.
        value: Decimal,
    },

    /// Two source records were supplied for the same date.
    #[error("Duplicate source record for {date}")]
    DuplicateRecord {
        /// The duplicated date.
        date: NaiveDate,
    },

    /// No source record exists for the requested date.
    #[error("No source record for {date}")]
    MissingRecord {
        /// The date that was requested.
        date: NaiveDate,
    },

    /// A computed value fell outside its admissible range.
    #[error("Value {value} of '{field}' is outside the admissible range [{min}, {max}]")]
    OutOfRange {
        /// The qualified field name (`facility.field`).
        field: String,
        /// The offending value.
        value: Decimal,
        /// Inclusive lower bound.
        min: Decimal,
        /// Inclusive upper bound.
        max: Decimal,
    },

    /// A calculator asked for a configured parameter that has no default.
    #[error("No default configured for parameter '{parameter}'")]
    MissingOverrideDefault {
        /// The parameter name.
        parameter: String,
    },

    /// A calculator read a same-day result of a facility that has not run.
    #[error("Facility '{facility}' requires '{upstream}' results that are not available")]
    MissingUpstream {
        /// The facility doing the reading.
        facility: String,
        /// The facility whose result was missing.
        upstream: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Returns a stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            EngineError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            EngineError::InvalidConfig { .. } => "INVALID_CONFIG",
            EngineError::InvalidRange { .. } => "INVALID_RANGE",
            EngineError::RangeTooLong { .. } => "RANGE_TOO_LONG",
            EngineError::InvalidInput { .. } => "INVALID_INPUT",
            EngineError::DuplicateRecord { .. } => "DUPLICATE_RECORD",
            EngineError::MissingRecord { .. } => "MISSING_RECORD",
            EngineError::OutOfRange { .. } => "OUT_OF_RANGE",
            EngineError::MissingOverrideDefault { .. } => "MISSING_OVERRIDE_DEFAULT",
            EngineError::MissingUpstream { .. } => "MISSING_UPSTREAM",
            EngineError::CalculationError { .. } => "CALCULATION_ERROR",
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
