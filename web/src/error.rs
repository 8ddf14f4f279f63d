//! Error types for web handlers.
//!
//! [`AppError`] bridges domain errors and HTTP responses. Every error renders
//! as `{"success": false, "code": ..., "message": ...}`; server-side failures
//! are logged with their source and never leak details to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quickstay_core::{BookingError, SignatureError, WebhookError};
use serde::Serialize;
use std::fmt;

/// Message shown to clients when the payment gateway fails.
pub const PAYMENT_FAILED: &str = "Payment failed";

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let booking = store.get(id).await
///         .map_err(|e| AppError::internal("Failed to load booking").with_source(e.into()))?
///         .ok_or_else(|| AppError::not_found("Booking", id))?;
///     Ok(Json(booking))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: &'static str,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST")
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND",
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), "CONFLICT")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.into(), "INTERNAL_SERVER_ERROR")
    }

    /// Create a 502 Bad Gateway error.
    #[must_use]
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message.into(), "PAYMENT_GATEWAY_ERROR")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Request failed"
                ),
            }
        } else {
            tracing::debug!(status = %self.status, code = self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorResponse {
            success: false,
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::RoomUnavailable => Self::conflict("Room is not available"),
            BookingError::NotFound { resource, id } => Self::not_found(resource, id),
            BookingError::InvalidDateRange
            | BookingError::InvalidGuestCount
            | BookingError::InvalidAmount => Self::bad_request(err.to_string()),
            BookingError::AlreadyPaid(_) => Self::new(
                StatusCode::CONFLICT,
                err.to_string(),
                "ALREADY_PAID",
            ),
            BookingError::Storage(store) => {
                Self::internal("An internal error occurred").with_source(store.into())
            },
            BookingError::Gateway(gateway) => Self::bad_gateway(PAYMENT_FAILED).with_source(gateway.into()),
        }
    }
}

impl From<WebhookError> for AppError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::Signature(SignatureError::UndecodablePayload(detail)) => {
                Self::new(StatusCode::BAD_REQUEST, format!("Webhook Error: {detail}"), "INVALID_PAYLOAD")
            },
            WebhookError::Signature(signature) => Self::new(
                StatusCode::BAD_REQUEST,
                format!("Webhook Error: {signature}"),
                "INVALID_SIGNATURE",
            ),
            WebhookError::MetadataMissing { .. } => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string(), "METADATA_MISSING")
            },
            WebhookError::BookingNotFound(id) => Self::not_found("Booking", id),
            WebhookError::Storage(store) => {
                Self::internal("An internal error occurred").with_source(store.into())
            },
            WebhookError::Gateway(gateway) => {
                Self::bad_gateway("Payment gateway lookup failed").with_source(gateway.into())
            },
        }
    }
}
