// Error handling module for the ticketing API
// Provides the HTTP-facing error type and the JSON error body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::notice::Notice;
use crate::orders::{CheckoutError, PricingError};
use crate::selection::SelectionError;
use crate::session::SessionError;

/// Message returned for every 500-level failure
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Main error type for the API
/// All handlers return Result<T, ApiError>
///
/// Each variant maps to one HTTP status code and error code.
#[derive(Debug)]
pub enum ApiError {
    /// DTO validation failures from the validator crate
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Malformed query or body values that are not DTO-validated
    /// Maps to HTTP 400 Bad Request
    BadRequest(String),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Operation not allowed in the current state
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// User-facing warning; nothing was changed
    /// Maps to HTTP 422 Unprocessable Entity
    Rejected(Notice),

    /// Request carried an Origin outside the CORS allow-list
    /// Maps to HTTP 403 Forbidden
    OriginNotAllowed(String),

    /// Anything else
    /// Maps to HTTP 500 Internal Server Error, details are never exposed
    InternalError(String),
}

/// Consistent error response structure
///
/// `error_code` is machine-readable, `message` is human-readable and
/// `details` carries extra structure such as field errors or a notice.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(
        error_code: &str,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            error_code: error_code.to_string(),
            message: message.into(),
            details,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ApiError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    /// Convert to status code and body, logging at a level that matches
    /// the severity: error! for 500s, warn! for refusals, debug! for
    /// ordinary client mistakes.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();
        let body = match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                ErrorResponse::new(
                    "VALIDATION_ERROR",
                    "Request validation failed",
                    Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({}))),
                )
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);
                ErrorResponse::new("BAD_REQUEST", message.clone(), None)
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                let message = format!("{} with id {} not found", resource, id);
                ErrorResponse::new("NOT_FOUND", message, None)
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                ErrorResponse::new("CONFLICT", message.clone(), None)
            }
            ApiError::Rejected(notice) => {
                debug!("Request rejected with notice: {}", notice);
                ErrorResponse::new(
                    "REJECTED",
                    notice.title.clone(),
                    serde_json::to_value(notice).ok(),
                )
            }
            ApiError::OriginNotAllowed(origin) => {
                warn!("Origin not allowed by CORS: {}", origin);
                ErrorResponse::new("ORIGIN_NOT_ALLOWED", "Not allowed by CORS", None)
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                ErrorResponse::new("INTERNAL_ERROR", GENERIC_FAILURE_MESSAGE, None)
            }
        };
        (status, body)
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::OriginNotAllowed(_) => StatusCode::FORBIDDEN,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NotFound(id) => ApiError::not_found("Session", id),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::MatchNotFound(id) => ApiError::not_found("Match", id),
        }
    }
}

impl From<SelectionError> for ApiError {
    fn from(error: SelectionError) -> Self {
        match error {
            SelectionError::UnknownBlock(id) => ApiError::not_found("Block", id),
            SelectionError::UnknownRow { block_id, row_number } => {
                ApiError::not_found("Row", format!("{}/{}", block_id, row_number))
            }
            SelectionError::UnknownSeat { row_number, seat_number } => {
                ApiError::not_found("Seat", format!("{}/{}", row_number, seat_number))
            }
            SelectionError::NoMatchSelected
            | SelectionError::BlockRequired
            | SelectionError::RowRequired => ApiError::Conflict {
                message: error.to_string(),
            },
            SelectionError::Incomplete => ApiError::Rejected(Notice::select_seats()),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::LineNotFound(id) => ApiError::not_found("Cart line", id),
            CartError::InvalidLine(message) => ApiError::BadRequest(message),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(error: CheckoutError) -> Self {
        match error {
            CheckoutError::TermsNotAccepted => ApiError::Rejected(Notice::accept_terms()),
            CheckoutError::EmptyCart => ApiError::Rejected(Notice::empty_cart()),
            CheckoutError::NotStarted => ApiError::not_found("Checkout", "current"),
            CheckoutError::InvalidTransition(message) => ApiError::Conflict { message },
            CheckoutError::Pricing(e) => e.into(),
        }
    }
}

impl From<PricingError> for ApiError {
    fn from(error: PricingError) -> Self {
        ApiError::BadRequest(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("Match", 9).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Rejected(Notice::select_seats()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::OriginNotAllowed("https://evil.example".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::InternalError("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_hides_details() {
        let (status, body) = ApiError::InternalError("pool exhausted".into()).to_error_response();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, GENERIC_FAILURE_MESSAGE);
        assert!(body.details.is_none());
    }

    #[test]
    fn test_rejected_carries_notice_details() {
        let (_, body) = ApiError::Rejected(Notice::seat_limit(10)).to_error_response();
        assert_eq!(body.error_code, "REJECTED");
        let details = body.details.unwrap();
        assert_eq!(details["title"], "Max 10 seats");
    }

    #[test]
    fn test_selection_ordering_errors_are_conflicts() {
        let err: ApiError = SelectionError::RowRequired.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let err: ApiError = SelectionError::Incomplete.into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_pricing_overflow_is_bad_request() {
        let err: ApiError = PricingError::Overflow.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let err: ApiError = CheckoutError::Pricing(PricingError::Overflow).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
