//! Configuration loading and management for the balance engine.
//!
//! This module provides functionality to load run configurations from YAML
//! files: scalar parameter defaults, delivery periods, the failure policy,
//! validation tables and opening balances.
//!
//! # Example
//!
//! ```no_run
//! use balance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/vankor_cluster").unwrap();
//! println!("Loaded configuration: {}", config.config().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CarryAfterFailure, ChangeLimit, DEFAULT_DELIVERY_PERIOD, DEFAULT_MAX_RUN_DAYS, EngineSettings, FailurePolicy,
    MissingRecordPolicy, OpeningBalances, OutOfRangePolicy, Range, RunConfig, ValidationTables,
    default_parameters,
};
