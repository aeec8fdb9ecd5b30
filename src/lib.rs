//! Daily Balance Engine for the Vankor oil-field cluster
//!
//! This crate computes, day by day, the oil production, delivery, stock and
//! loss figures of the cluster's preparation, pumping and metering facilities.
//! Results of each day feed the next; every computed value is checked against
//! configured ranges and daily-change limits before it is accepted.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod store;
