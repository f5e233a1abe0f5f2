use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use admin_gate::Role;
use admin_gate_axum::{ADMIN_LOGOUT_URL, AuthUser};

use super::{PageError, render};
use crate::AppState;

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    display_name: &'a str,
    role: &'a str,
    faq_count: i64,
    can_edit: bool,
    is_admin: bool,
    csrf_token: &'a str,
    logout_url: &'a str,
}

pub(crate) async fn index() -> impl IntoResponse {
    Redirect::to("/console")
}

pub(crate) async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, PageError> {
    user.require(Role::Viewer)?;
    let faq_count = state.content.count_faqs().await?;

    render(
        StatusCode::OK,
        &DashboardTemplate {
            display_name: &user.display_name,
            role: user.role.as_str(),
            faq_count,
            can_edit: user.role.allows(Role::Editor),
            is_admin: user.role.allows(Role::Admin),
            csrf_token: &user.csrf_token,
            logout_url: ADMIN_LOGOUT_URL.as_str(),
        },
    )
}
