//! Identity extraction.
//!
//! Login itself happens out of band at the identity provider. Requests then
//! carry the opaque user id it issued as a bearer token, and the provider
//! calls back with the user's profile to create or refresh their record.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderName},
};

use crate::error::AppError;
use crate::AppState;

fn unauthorized(reason: &'static str) -> AppError {
    tracing::debug!(reason, "Rejected unauthenticated request");
    AppError::Unauthorized
}

/// Header the identity provider presents on the login callback.
pub static IDENTITY_SECRET_HEADER: HeaderName = HeaderName::from_static("x-identity-secret");

/// Authenticated user extracted from request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Opaque id issued by the identity provider
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                let user_id = header.trim_start_matches("Bearer ").trim().to_string();
                if user_id.is_empty() {
                    return Err(unauthorized("Empty bearer token"));
                }
                Ok(AuthUser { user_id })
            }
            Some(_) => Err(unauthorized("Invalid authorization header format")),
            None => Err(unauthorized("Missing authorization header")),
        }
    }
}

/// Marker for requests made by the identity provider itself.
///
/// When no secret is configured every caller is accepted, which is only
/// meant for development.
#[derive(Debug, Clone, Copy)]
pub struct IdentityProvider;

impl FromRequestParts<AppState> for IdentityProvider {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.identity_secret.as_deref() else {
            return Ok(IdentityProvider);
        };

        let presented = parts
            .headers
            .get(&IDENTITY_SECRET_HEADER)
            .and_then(|value| value.to_str().ok());

        match presented {
            Some(secret) if secret == expected => Ok(IdentityProvider),
            Some(_) => Err(unauthorized("Invalid identity secret")),
            None => Err(unauthorized("Missing identity secret")),
        }
    }
}
