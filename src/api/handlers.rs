//! HTTP request handlers for the cost projection API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::CostAggregator;
use crate::error::EngineResult;
use crate::models::{Grade, GradeStep, Step};

use super::request::CalculationRequest;
use super::response::{
    ApiError, ApiErrorResponse, CalculationResponse, SalaryResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/salaries/:year/:grade/:step", get(salary_handler))
        .with_state(state)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a position and window and returns the cost projection.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    ApiError::validation_error(body_text)
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
            return error_response(ApiErrorResponse::bad_request(error));
        }
    };

    let start_time = Instant::now();
    match perform_calculation(request, &state) {
        Ok(response) => {
            info!(
                correlation_id = %correlation_id,
                months = response.projection.entries.len(),
                total = %response.projection.total,
                bonus_total = %response.projection.bonus_total,
                warnings = response.projection.audit_trace.warnings.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Calculation failed"
            );
            error_response(err.into())
        }
    }
}

fn perform_calculation(
    request: CalculationRequest,
    state: &AppState,
) -> EngineResult<CalculationResponse> {
    let timeline = request.into_timeline()?;
    let projection = CostAggregator::new(state.table()).calc(&timeline)?;

    Ok(CalculationResponse {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        projection,
    })
}

/// Handler for GET /salaries/:year/:grade/:step endpoint.
///
/// Returns the monthly base and special payment percentage for one grade and
/// step, including which year's data was used.
async fn salary_handler(
    State(state): State<AppState>,
    params: Result<Path<(i32, String, u8)>, PathRejection>,
) -> Response {
    let (year, grade, step) = match params {
        Ok(Path(params)) => params,
        Err(rejection) => {
            return error_response(ApiErrorResponse::bad_request(
                ApiError::validation_error(rejection.body_text()),
            ));
        }
    };

    let grade: Grade = match grade.parse() {
        Ok(grade) => grade,
        Err(message) => {
            return error_response(ApiErrorResponse::bad_request(ApiError::validation_error(
                message,
            )));
        }
    };
    let Some(step) = Step::from_number(step) else {
        return error_response(ApiErrorResponse::bad_request(ApiError::validation_error(
            format!("unknown step {} (known: 1 to 6)", step),
        )));
    };

    match lookup_salary(&state, year, GradeStep::new(grade, step)) {
        Ok(response) => {
            if response.fallback {
                warn!(
                    grade_step = %response.grade_step,
                    year = response.year,
                    source_year = response.source_year,
                    "Salary lookup used another year"
                );
            }
            json_response(StatusCode::OK, response)
        }
        Err(err) => {
            warn!(error = %err, "Salary lookup failed");
            error_response(err.into())
        }
    }
}

fn lookup_salary(state: &AppState, year: i32, grade_step: GradeStep) -> EngineResult<SalaryResponse> {
    let lookup = state.table().lookup(year, grade_step.grade)?;

    Ok(SalaryResponse {
        year,
        source_year: lookup.source_year,
        fallback: lookup.is_fallback(),
        grade_step,
        monthly_base: lookup.monthly_base(grade_step.step),
        bonus_percent: lookup.bonus_percent(),
    })
}
