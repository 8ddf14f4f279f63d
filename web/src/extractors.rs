//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: request correlation id
//! - [`Caller`]: the authenticated user, from trusted upstream headers
//! - [`RequestOrigin`]: the browser `Origin`, used to build redirect URLs
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     caller: Caller,
//!     RequestOrigin(origin): RequestOrigin,
//! ) -> Result<Json<Response>, AppError> {
//!     tracing::info!(user_id = %caller.user_id, %origin, "Processing request");
//!     Ok(Json(response))
//! }
//! ```

use crate::error::AppError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use quickstay_core::UserId;
use uuid::Uuid;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "X-User-Id";
/// Header carrying the authenticated user's email address.
pub const USER_EMAIL_HEADER: &str = "X-User-Email";
/// Header carrying the authenticated user's display name.
pub const USER_NAME_HEADER: &str = "X-User-Name";

/// Correlation ID for request tracing.
///
/// Read from request extensions when the correlation middleware is
/// installed, otherwise from the `X-Correlation-ID` header, otherwise a new
/// UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        let id = header_str(&parts.headers, crate::middleware::CORRELATION_ID_HEADER)
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(id))
    }
}

/// Authenticated caller.
///
/// Identity is established by the auth layer in front of this service and
/// forwarded in `X-User-Id` (UUID), `X-User-Email` and `X-User-Name`.
/// A missing or invalid id or email rejects the request with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// User id
    pub user_id: UserId,
    /// Email address, used for booking confirmations
    pub email: String,
    /// Display name (falls back to the email address)
    pub name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_str(&parts.headers, USER_ID_HEADER)
            .ok_or_else(|| AppError::unauthorized("Not authenticated"))?
            .parse::<UserId>()
            .map_err(|_| AppError::unauthorized("Invalid user id"))?;

        let email = header_str(&parts.headers, USER_EMAIL_HEADER)
            .filter(|email| email.contains('@'))
            .ok_or_else(|| AppError::unauthorized("Missing user email"))?
            .to_string();

        let name = header_str(&parts.headers, USER_NAME_HEADER)
            .map_or_else(|| email.clone(), str::to_string);

        Ok(Self {
            user_id,
            email,
            name,
        })
    }
}

/// Browser origin of the request (`Origin` header), without trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequestOrigin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_str(&parts.headers, header::ORIGIN.as_str())
            .map(|origin| Self(origin.trim_end_matches('/').to_string()))
            .ok_or_else(|| AppError::bad_request("Missing Origin header"))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
