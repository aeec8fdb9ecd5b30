//! Read-only data access used while a run is in progress.
//!
//! This module provides the record store, the monthly aggregate cache and the
//! override resolver.

mod monthly_cache;
mod overrides;
mod record_store;

pub use monthly_cache::{MonthlyAggregate, MonthlyContextCache};
pub use overrides::{Override, OverrideResolver};
pub use record_store::RecordStore;
