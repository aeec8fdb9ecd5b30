//! Core data models for the balance engine.
//!
//! This module contains the domain models shared by the store, the
//! calculators, the pipeline and the report builder.

mod calculation_result;
mod day_record;
mod facility;
mod result_table;

pub use calculation_result::{Alarm, CalculationResult, DayRow};
pub use day_record::{DayRecord, MAX_INPUT_MAGNITUDE, MAX_INPUT_SCALE, MonthKey, check_input};
pub use facility::Facility;
pub use result_table::{DayFailure, ResultTable, RunReport, RunSummary};
