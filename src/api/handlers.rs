//! HTTP request handlers for the shift billing API.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{HolidayCalendar, run_billing};

use super::request::ComputeRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/compute", post(compute_handler))
        .route("/partners", get(partners_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn rejection_error(rejection: JsonRejection, correlation_id: Uuid) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Handler for POST /compute.
///
/// Runs the billing engine for one partner over the submitted files.
async fn compute_handler(
    State(state): State<AppState>,
    payload: Result<Json<ComputeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing compute request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return json_response(StatusCode::BAD_REQUEST, rejection_error(rejection, correlation_id));
        }
    };

    let config = state.config();
    let policy = match config.get_policy(&request.partner) {
        Ok(policy) => policy,
        Err(_) => {
            warn!(correlation_id = %correlation_id, partner = %request.partner, "Partner not found");
            return json_response(
                StatusCode::BAD_REQUEST,
                ApiError::partner_not_found(&request.partner, &config.partner_ids()),
            );
        }
    };

    let calendar = match &request.holidays {
        Some(dates) => HolidayCalendar::with_overrides(dates.iter().copied()),
        None => HolidayCalendar::italian(),
    };
    let sheets = request.into_sheets();

    match run_billing(&sheets, policy, &calendar, config.collaborators()) {
        Ok(output) => {
            info!(
                correlation_id = %correlation_id,
                partner = %output.partner_id,
                blocks = output.summary.blocks,
                discrepancies = output.discrepancies.len(),
                duration_us = output.summary.duration_us,
                "Compute request completed"
            );
            json_response(StatusCode::OK, output)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Billing run failed");
            let api_error: ApiErrorResponse = err.into();
            json_response(api_error.status, api_error.error)
        }
    }
}

/// Handler for GET /partners.
async fn partners_handler(State(state): State<AppState>) -> Response {
    let partners: Vec<&str> = state.config().partner_ids();
    json_response(StatusCode::OK, serde_json::json!({ "partners": partners }))
}
