//! HTTP request handlers for the balance engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{DayRecord, RunReport};
use crate::report::ReportBuilder;
use crate::store::Override;

use super::request::RunRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/run", post(run_handler))
        .route("/report", post(report_handler))
        .with_state(state)
}

/// Handler for POST /run.
///
/// Runs the pipeline over the requested range and returns the raw result
/// table with its failures and summary.
async fn run_handler(
    State(state): State<AppState>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing run request");

    let request = match parse_request(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match execute(&state, correlation_id, request).await {
        Ok(report) => json_ok(&report),
        Err(error) => error.into_response(),
    }
}

/// Handler for POST /report.
///
/// Runs the pipeline and returns the report document: per-day values with
/// check status, monthly totals and control checks.
async fn report_handler(
    State(state): State<AppState>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing report request");

    let request = match parse_request(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match execute(&state, correlation_id, request).await {
        Ok(run) => {
            let report = ReportBuilder::new(&state.pipeline().config().validation).build(&run);
            json_ok(&report)
        }
        Err(error) => error.into_response(),
    }
}

/// Maps a body rejection to a 400 response.
fn parse_request(
    correlation_id: Uuid,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Result<RunRequest, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };

    Err(ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
    .into_response())
}

/// Runs the pipeline for one request on the blocking pool, logging the outcome.
async fn execute(
    state: &AppState,
    correlation_id: Uuid,
    request: RunRequest,
) -> Result<RunReport, ApiErrorResponse> {
    let records: Vec<DayRecord> = request.records.into_iter().map(Into::into).collect();
    let overrides: Vec<Override> = request.overrides.into_iter().map(Into::into).collect();
    let records_count = records.len();

    let start_time = Instant::now();
    let state = state.clone();
    let result: EngineResult<RunReport> = tokio::task::spawn_blocking(move || {
        state
            .pipeline()
            .run(records, overrides, request.start_date, request.end_date)
    })
    .await
    .unwrap_or_else(|err| {
        Err(EngineError::CalculationError {
            message: format!("run task failed: {}", err),
        })
    });

    match result {
        Ok(report) => {
            let duration = start_time.elapsed();
            info!(
                correlation_id = %correlation_id,
                records_count,
                days_validated = report.summary.days_validated,
                days_failed = report.summary.days_failed,
                aborted = report.summary.aborted,
                duration_us = duration.as_micros(),
                "Run completed successfully"
            );
            Ok(report)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                code = err.code(),
                "Run failed"
            );
            Err(err.into())
        }
    }
}

fn json_ok<T: serde::Serialize>(body: &T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}
