//! HTTP mapping for login failures
//!
//! The body only ever names the failure class. Causes stay in the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use login::LoginError;

/// A login failure bound to the request it happened on.
#[derive(Debug)]
pub struct ApiError {
    pub error: LoginError,
    pub request_id: String,
}

impl ApiError {
    pub fn new(error: LoginError, request_id: impl Into<String>) -> Self {
        Self {
            error,
            request_id: request_id.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            LoginError::VerificationFailed | LoginError::InvalidToken => StatusCode::UNAUTHORIZED,
            LoginError::ProfileUnavailable => StatusCode::BAD_GATEWAY,
            LoginError::IdentityResolutionFailed | LoginError::TokenIssuanceFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self.error {
            LoginError::VerificationFailed => "verification_failed",
            LoginError::ProfileUnavailable => "profile_unavailable",
            LoginError::IdentityResolutionFailed => "identity_resolution_failed",
            LoginError::TokenIssuanceFailed => "token_issuance_failed",
            LoginError::InvalidToken => "invalid_token",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "type": self.error_type(),
                "message": self.error.to_string(),
                "request_id": self.request_id,
                "login_url": "/auth/steam/login",
            }
        });
        (
            self.status(),
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
