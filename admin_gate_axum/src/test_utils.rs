//! Shared setup for router tests: environment, stores and a seeded editor account.

use std::sync::Once;

use admin_gate::{NewUser, Role, UserStore};
use axum::{
    Form, Router,
    body::{Body, to_bytes},
    middleware::from_fn,
    response::Response,
    routing::{get, post},
};
use http::header::SET_COOKIE;
use std::collections::HashMap;

use crate::{AuthRejection, AuthUser, admin_gate_router_no_trace, require_login, session_middleware};

pub(crate) const EDITOR_USERNAME: &str = "axum_editor";
pub(crate) const EDITOR_PASSWORD: &str = "editor-pass-123";

const TEST_DEFAULTS: &[(&str, &str)] = &[
    ("GENERIC_CACHE_STORE_TYPE", "memory"),
    ("GENERIC_CACHE_STORE_URL", "memory"),
    ("GENERIC_DATA_STORE_TYPE", "sqlite"),
    ("GENERIC_DATA_STORE_URL", "sqlite:/tmp/admin_gate_axum_test.db"),
    ("SESSION_COOKIE_SECURE", "false"),
    ("ADMIN_TRUST_FORWARDED_FOR", "true"),
];

pub(crate) async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
        for (key, value) in TEST_DEFAULTS {
            if std::env::var(key).is_err() {
                // Runs once, before any test reads the environment.
                unsafe { std::env::set_var(key, value) };
            }
        }
        let _ = std::fs::remove_file("/tmp/admin_gate_axum_test.db");
    });

    if let Err(e) = admin_gate::init().await {
        eprintln!("Warning: Failed to initialize admin-gate: {e}");
    }

    if matches!(UserStore::get_user_by_username(EDITOR_USERNAME).await, Ok(None)) {
        let editor = NewUser {
            username: EDITOR_USERNAME.to_string(),
            password: EDITOR_PASSWORD.to_string(),
            display_name: "Axum Editor".to_string(),
            role: Role::Editor,
        };
        if let Err(e) = UserStore::create_user(&editor).await {
            eprintln!("Warning: Failed to create test user: {e}");
        }
    }
}

async fn console(user: AuthUser) -> String {
    format!("Hello, {}! csrf={}", user.display_name, user.csrf_token)
}

async fn console_save(
    user: AuthUser,
    Form(form): Form<HashMap<String, String>>,
) -> Result<&'static str, AuthRejection> {
    let submitted = form.get("csrf_token").map(String::as_str).unwrap_or_default();
    user.verify_csrf(submitted).await?;
    Ok("saved")
}

async fn console_ping(_user: AuthUser) -> &'static str {
    "pong"
}

async fn admin_only(user: AuthUser) -> Result<&'static str, AuthRejection> {
    user.require(Role::Admin)?;
    Ok("admin area")
}

/// Application shaped like a real console: gated pages plus the gate's own routes.
pub(crate) fn test_app() -> Router {
    Router::new()
        .route("/console", get(console))
        .route("/console/save", post(console_save))
        .route("/console/ping", post(console_ping))
        .route("/console/admin", get(admin_only))
        .route_layer(from_fn(require_login))
        .nest("/admin", admin_gate_router_no_trace())
        .layer(from_fn(session_middleware))
}

/// `name=value` pair of the session cookie set on a response.
pub(crate) fn session_cookie(response: &Response) -> Option<String> {
    let name = admin_gate::SESSION_COOKIE_NAME.as_str();
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{name}=")))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub(crate) async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Value of the hidden `csrf_token` input in a rendered form.
pub(crate) fn csrf_from_html(html: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')?;
    Some(html[start..start + end].to_string())
}

pub(crate) fn empty() -> Body {
    Body::empty()
}
