use admin_gate::{AuthError, logout, validate_token};
use axum::{
    Form,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::config::ADMIN_LOGIN_URL;
use crate::error::{AuthRejection, IntoResponseError};
use crate::session::SessionHandle;

#[derive(Deserialize)]
pub(crate) struct LogoutForm {
    #[serde(default)]
    csrf_token: String,
}

/// Destroy the session and return to the login page. Requires the form's CSRF token.
pub(crate) async fn logout_submit(
    handle: SessionHandle,
    Form(form): Form<LogoutForm>,
) -> Result<Response, (StatusCode, String)> {
    let now = Utc::now();
    let mut session = handle.lock().await;

    if !validate_token(&session, &form.csrf_token, now) {
        tracing::warn!("Logout with invalid CSRF token");
        return Ok(AuthRejection(AuthError::InvalidCsrf).into_response());
    }

    logout(&mut session, now).into_response_error()?;
    Ok(Redirect::to(ADMIN_LOGIN_URL.as_str()).into_response())
}
