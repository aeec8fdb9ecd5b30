//! Date-by-date pipeline over the facility calculators.
//!
//! [`BalancePipeline`] walks the requested dates in ascending order and moves
//! each one through the [`DayState`] machine, carrying validated rows into
//! the next date.

mod driver;
mod state;

pub use driver::BalancePipeline;
pub use state::DayState;
