//! # Authentication Middleware
//!
//! This module provides the Axum extractor for license-key authentication.
//! Every protected handler takes an `AuthenticatedUser` argument, which
//! resolves the opaque `x-license-key` header to a full user record,
//! creating the account on first sight.
//!
//! Resolution is deliberately separate from authorization: handlers receive
//! the resolved identity and scope every query by its id, so swapping the
//! resolution mechanism (e.g. for a real OAuth flow) never touches call
//! sites.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use core_access::{get_or_create_user, verify_license, User};
use serde_json::json;
use tracing::{error, warn};

use crate::state::AppState;

/// The request header carrying the opaque per-user credential.
pub const LICENSE_HEADER: &str = "x-license-key";

/// An Axum extractor that provides the currently authenticated user.
///
/// 1. **Missing or malformed key**: rejects with `401 Unauthorized` before
///    the handler runs, so no partial work is ever performed.
/// 2. **Well-formed key**: resolves to the matching user, creating one on
///    first sight.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// A custom rejection type for authentication failures.
///
/// This allows the `FromRequestParts` implementation to return a specific
/// HTTP status code and error message, which Axum then turns into a response.
pub struct AuthError(StatusCode, String);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let license_key = parts
            .headers
            .get(LICENSE_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if !verify_license(license_key) {
            warn!("Request rejected: missing or invalid license key.");
            return Err(AuthError(
                StatusCode::UNAUTHORIZED,
                "Missing or invalid license key.".to_string(),
            ));
        }

        let user = get_or_create_user(&state.sqlite_provider.db, license_key)
            .await
            .map_err(|e| {
                // This is an internal error because the DB should be available.
                error!("Failed to get or create user: {}", e);
                AuthError(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Could not retrieve user: {e}"),
                )
            })?;

        Ok(AuthenticatedUser(user))
    }
}
