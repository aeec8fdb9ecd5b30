//! HTTP API module for the balance engine.
//!
//! Exposes the daily pipeline over HTTP: `POST /run` returns the result
//! table and `POST /report` the report document for the same request body.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{OverrideRequest, RecordRequest, RunRequest};
pub use response::ApiError;
pub use state::AppState;
