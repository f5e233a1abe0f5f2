use std::time::Duration;

use admin_gate::AuthError;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::{TypedHeader, headers::RetryAfter};
use http::{Result as HttpResponse, StatusCode};

use crate::config::{ADMIN_LOGIN_URL, expired_login_url};

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCsrf => StatusCode::FORBIDDEN,
        AuthError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
        AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AuthError::Session(_) | AuthError::User(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Only the generic client-facing message leaves the server.
impl<T> IntoResponseError<T> for Result<T, AuthError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (status_for(&e), e.user_message()))
    }
}

/// Implementation for http::Error (used by Response::builder())
impl<T> IntoResponseError<T> for HttpResponse<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}

/// Template rendering failures
impl<T> IntoResponseError<T> for Result<T, askama::Error> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            tracing::error!("Template rendering failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong, please try again.".to_string(),
            )
        })
    }
}

/// Response form of an [`AuthError`].
///
/// Expired and anonymous sessions are sent to the login page; rate limiting
/// carries a `Retry-After` header.
#[derive(Debug)]
pub struct AuthRejection(pub AuthError);

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match &self.0 {
            AuthError::SessionExpired => Redirect::to(&expired_login_url()).into_response(),
            AuthError::Unauthorized => Redirect::to(ADMIN_LOGIN_URL.as_str()).into_response(),
            AuthError::RateLimited {
                retry_after_seconds,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                TypedHeader(RetryAfter::delay(Duration::from_secs(*retry_after_seconds))),
                self.0.user_message(),
            )
                .into_response(),
            other => (status_for(other), other.user_message()).into_response(),
        }
    }
}
