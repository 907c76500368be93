//! HTTP request handlers for the salary tax engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::ENGINE_VERSION;

use super::request::{CalculationRequest, RegimesQuery};
use super::response::{ApiError, ApiErrorResponse, HealthResponse, RegimesResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/regimes", get(regimes_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a salary profile with options and returns the multi-regime
/// breakdown.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Generate correlation ID for request tracking
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
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    match state
        .engine()
        .calculate_from_json(&request.profile, &request.options)
    {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                calculation_id = %result.metadata.calculation_id,
                fy = %result.fy,
                regimes = result.regimes.len(),
                duration_us = result.metadata.duration_us,
                "Calculation completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(result),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Calculation failed"
            );
            let api_error: ApiErrorResponse = err.into();
            (
                api_error.status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(api_error.error),
            )
                .into_response()
        }
    }
}

/// Handler for GET /regimes endpoint.
///
/// Lists the regimes modelled for a financial year.
async fn regimes_handler(
    State(state): State<AppState>,
    Query(query): Query<RegimesQuery>,
) -> Json<RegimesResponse> {
    let resolved = state.engine().fetcher().resolve(query.fy.as_deref());
    Json(RegimesResponse {
        fy: resolved.financial_year,
        fallback: resolved.fallback,
        regimes: resolved.rules.available_regimes().into_iter().collect(),
    })
}

/// Handler for GET /health endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: ENGINE_VERSION.to_string(),
    })
}
