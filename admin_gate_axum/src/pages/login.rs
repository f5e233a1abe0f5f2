use std::time::Duration;

use admin_gate::{AuthError, Credentials, Session, issue_or_reuse_token, login, validate_token};
use askama::Template;
use axum::{
    Form,
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::{TypedHeader, headers::RetryAfter};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::{ADMIN_LOGIN_URL, ADMIN_REDIRECT_AFTER_LOGIN, safe_next};
use crate::error::IntoResponseError;
use crate::session::{ClientAddress, SessionHandle};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate<'a> {
    notice: &'a str,
    error: &'a str,
    csrf_token: &'a str,
    next: &'a str,
    login_url: &'a str,
    username: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    expired: Option<String>,
    next: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    csrf_token: String,
    #[serde(default)]
    next: String,
}

fn landing(next: Option<&str>) -> &str {
    safe_next(next.filter(|n| !n.is_empty())).unwrap_or(ADMIN_REDIRECT_AFTER_LOGIN.as_str())
}

struct LoginView<'a> {
    notice: &'a str,
    error: &'a str,
    next: &'a str,
    username: &'a str,
}

fn render(
    session: &mut Session,
    now: DateTime<Utc>,
    view: LoginView<'_>,
) -> Result<String, (StatusCode, String)> {
    let token = issue_or_reuse_token(session, now).map_err(|e| {
        tracing::error!(error = %e, "Failed to issue CSRF token");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong, please try again.".to_string(),
        )
    })?;

    LoginTemplate {
        notice: view.notice,
        error: view.error,
        csrf_token: token.as_str(),
        next: view.next,
        login_url: ADMIN_LOGIN_URL.as_str(),
        username: view.username,
    }
    .render()
    .into_response_error()
}

pub(crate) async fn login_page(
    handle: SessionHandle,
    Query(query): Query<LoginQuery>,
) -> Result<Response, (StatusCode, String)> {
    let now = Utc::now();
    let mut session = handle.lock().await;

    if session.is_authenticated() {
        return Ok(Redirect::to(landing(query.next.as_deref())).into_response());
    }

    let notice = if query.expired.as_deref() == Some("1") {
        AuthError::SessionExpired.user_message()
    } else {
        String::new()
    };
    let next = safe_next(query.next.as_deref()).unwrap_or_default();

    let html = render(
        &mut session,
        now,
        LoginView {
            notice: &notice,
            error: "",
            next,
            username: "",
        },
    )?;
    Ok(Html(html).into_response())
}

pub(crate) async fn login_submit(
    handle: SessionHandle,
    ClientAddress(client): ClientAddress,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    let now = Utc::now();
    let mut session = handle.lock().await;
    let next = safe_next(Some(form.next.as_str())).unwrap_or_default();

    if !validate_token(&session, &form.csrf_token, now) {
        tracing::warn!(action = "login", client = %client, at = %now, "Login form with invalid CSRF token");
        let message = AuthError::InvalidCsrf.user_message();
        let html = render(
            &mut session,
            now,
            LoginView {
                notice: "",
                error: &message,
                next,
                username: &form.username,
            },
        )?;
        return Ok((StatusCode::FORBIDDEN, Html(html)).into_response());
    }

    let credentials = Credentials {
        username: form.username.clone(),
        password: form.password,
    };

    match login(&mut session, &credentials, &client, now).await {
        Ok(_) => Ok(Redirect::to(landing(Some(next))).into_response()),
        Err(err) => {
            let message = err.user_message();
            let html = render(
                &mut session,
                now,
                LoginView {
                    notice: "",
                    error: &message,
                    next,
                    username: &form.username,
                },
            )?;
            Ok(match err {
                AuthError::RateLimited {
                    retry_after_seconds,
                } => (
                    StatusCode::TOO_MANY_REQUESTS,
                    TypedHeader(RetryAfter::delay(Duration::from_secs(retry_after_seconds))),
                    Html(html),
                )
                    .into_response(),
                AuthError::Session(_) | AuthError::User(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
                }
                _ => (StatusCode::UNAUTHORIZED, Html(html)).into_response(),
            })
        }
    }
}
