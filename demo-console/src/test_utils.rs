//! Console app wired the way `main` wires it, plus a cookie-keeping client.

use std::sync::Once;

use admin_gate::{NewUser, Role, UserStore};
use admin_gate_axum::{ADMIN_LOGIN_URL, ADMIN_ROUTE_PREFIX, admin_gate_router_no_trace, session_middleware};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        request::Builder,
    },
    middleware::from_fn,
    response::Response,
};
use tower::ServiceExt;

use crate::{AppState, console_router, content::ContentStore};

pub(crate) const PASSWORD: &str = "console-pass-123";

const TEST_DEFAULTS: &[(&str, &str)] = &[
    ("GENERIC_CACHE_STORE_TYPE", "memory"),
    ("GENERIC_CACHE_STORE_URL", "memory"),
    ("GENERIC_DATA_STORE_TYPE", "sqlite"),
    ("GENERIC_DATA_STORE_URL", "sqlite:/tmp/demo_console_test.db"),
    ("SESSION_COOKIE_SECURE", "false"),
    ("ADMIN_TRUST_FORWARDED_FOR", "true"),
];

const ACCOUNTS: &[(&str, Role)] = &[
    ("console_viewer", Role::Viewer),
    ("console_editor", Role::Editor),
    ("console_admin", Role::Admin),
];

/// Prepare the gate's stores and one account per role.
pub(crate) async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        for (key, value) in TEST_DEFAULTS {
            if std::env::var(key).is_err() {
                // Runs once, before any test reads the environment.
                unsafe { std::env::set_var(key, value) };
            }
        }
        let _ = std::fs::remove_file("/tmp/demo_console_test.db");
    });

    if let Err(e) = admin_gate::init().await {
        eprintln!("Warning: Failed to initialize admin-gate: {e}");
    }

    for (username, role) in ACCOUNTS {
        if matches!(UserStore::get_user_by_username(username).await, Ok(None)) {
            let user = NewUser {
                username: username.to_string(),
                password: PASSWORD.to_string(),
                display_name: username.to_string(),
                role: *role,
            };
            if let Err(e) = UserStore::create_user(&user).await {
                eprintln!("Warning: Failed to create {username}: {e}");
            }
        }
    }
}

/// Username of the seeded account holding `role`.
pub(crate) fn username_for(role: Role) -> &'static str {
    ACCOUNTS
        .iter()
        .find(|(_, r)| *r == role)
        .map(|(name, _)| *name)
        .unwrap()
}

pub(crate) async fn test_app() -> (Router, ContentStore) {
    let content = ContentStore::in_memory().await.unwrap();
    let app = Router::new()
        .merge(console_router(AppState {
            content: content.clone(),
        }))
        .nest(ADMIN_ROUTE_PREFIX.as_str(), admin_gate_router_no_trace())
        .layer(from_fn(session_middleware));
    (app, content)
}

pub(crate) struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    pub(crate) fn new(app: &Router) -> Self {
        Self {
            app: app.clone(),
            cookie: None,
        }
    }

    async fn send(&mut self, builder: Builder, body: Body) -> Response {
        let mut builder = builder.header("x-forwarded-for", "203.0.113.50");
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        if let Some(cookie) = session_cookie(&response) {
            self.cookie = Some(cookie);
        }
        response
    }

    pub(crate) async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::get(uri), Body::empty()).await
    }

    pub(crate) async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.send(
            Request::post(uri).header(CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body),
        )
        .await
    }

    /// Sign in as the seeded account for `role`.
    pub(crate) async fn log_in_as(&mut self, role: Role) {
        let page = self.get(ADMIN_LOGIN_URL.as_str()).await;
        assert_eq!(page.status(), StatusCode::OK);
        let token = csrf_from_html(&body_string(page).await).unwrap();

        let response = self
            .post_form(
                ADMIN_LOGIN_URL.as_str(),
                &[
                    ("csrf_token", &token),
                    ("username", username_for(role)),
                    ("password", PASSWORD),
                ],
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login as {role}");
    }

    /// Token rendered into the dashboard's logout form.
    pub(crate) async fn console_token(&mut self) -> String {
        let response = self.get("/console").await;
        assert_eq!(response.status(), StatusCode::OK);
        csrf_from_html(&body_string(response).await).unwrap()
    }
}

fn session_cookie(response: &Response) -> Option<String> {
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

pub(crate) fn csrf_from_html(html: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')?;
    Some(html[start..start + end].to_string())
}
