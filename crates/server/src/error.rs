//! HTTP mapping of authentication failures

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use oidc_rp_domain::AuthError;
use tracing::warn;

/// Error returned by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The provider redirected back with an `error` parameter.
    #[error("authorization failed: {error}")]
    Authorization { error: String, description: Option<String> },

    #[error("missing state or code parameter")]
    MissingCallbackParameters,
}

impl AppError {
    /// Status code and plain-text body sent to the browser.
    pub fn status_and_body(&self) -> (StatusCode, String) {
        match self {
            AppError::Auth(err) => auth_status_and_body(err),
            AppError::Authorization { error, description } => {
                let body = match description {
                    Some(description) => format!("Authorization failed: {error} ({description})"),
                    None => format!("Authorization failed: {error}"),
                };
                (StatusCode::BAD_REQUEST, body)
            }
            AppError::MissingCallbackParameters => {
                (StatusCode::BAD_REQUEST, "Missing state or code parameter".to_string())
            }
        }
    }
}

fn auth_status_and_body(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::CsrfMismatch => {
            (StatusCode::BAD_REQUEST, "Invalid state parameter".to_string())
        }
        AuthError::TokenExchangeFailed(inner) => {
            (StatusCode::BAD_GATEWAY, format!("Error exchanging tokens: {inner}"))
        }
        AuthError::IdTokenInvalid(inner) => {
            (StatusCode::BAD_REQUEST, format!("Invalid ID token: {inner}"))
        }
        AuthError::NoRefreshToken => {
            (StatusCode::BAD_REQUEST, "No refresh token available.".to_string())
        }
        AuthError::NoActiveSession => {
            (StatusCode::BAD_REQUEST, "No ID token available.".to_string())
        }
        AuthError::LogoutFailed { status: Some(status), .. } => {
            (StatusCode::BAD_GATEWAY, format!("Error logging out: {status}"))
        }
        AuthError::LogoutFailed { status: None, message } => {
            (StatusCode::BAD_GATEWAY, format!("Error logging out: {message}"))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        match &self {
            AppError::Auth(err) => {
                warn!(error = err.label(), status = status.as_u16(), "Request failed");
            }
            other => warn!(error = %other, status = status.as_u16(), "Request failed"),
        }
        (status, body).into_response()
    }
}
