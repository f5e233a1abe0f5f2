use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use admin_gate::{Role, sanitize_text, validate_email_address, validate_url};
use admin_gate_axum::{ADMIN_LOGOUT_URL, AuthUser};

use super::{PageError, render};
use crate::AppState;
use crate::content::SiteSettings;

const SITE_NAME_MAX_LENGTH: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SettingsForm {
    #[serde(default)]
    csrf_token: String,
    #[serde(default)]
    site_name: String,
    #[serde(default)]
    contact_email: String,
    #[serde(default)]
    site_url: String,
}

#[derive(Deserialize)]
pub(crate) struct SettingsQuery {
    saved: Option<String>,
}

#[derive(Template)]
#[template(path = "settings.html")]
struct SettingsTemplate<'a> {
    notice: &'a str,
    errors: &'a [&'static str],
    site_name: &'a str,
    contact_email: &'a str,
    site_url: &'a str,
    csrf_token: &'a str,
    logout_url: &'a str,
}

/// Site name is required; email and URL may be left blank but must be valid when given.
fn validate_settings_form(form: &SettingsForm) -> Result<SiteSettings, Vec<&'static str>> {
    let mut errors = Vec::new();

    let site_name = sanitize_text(&form.site_name, Some(SITE_NAME_MAX_LENGTH));
    if site_name.is_empty() {
        errors.push("Site name is required.");
    }

    let contact_email = if form.contact_email.trim().is_empty() {
        String::new()
    } else {
        validate_email_address(&form.contact_email).unwrap_or_else(|| {
            errors.push("Contact email is not a valid address.");
            String::new()
        })
    };

    let site_url = if form.site_url.trim().is_empty() {
        String::new()
    } else {
        validate_url(&form.site_url).unwrap_or_else(|| {
            errors.push("Site URL must be an http or https address.");
            String::new()
        })
    };

    if errors.is_empty() {
        Ok(SiteSettings {
            site_name,
            contact_email,
            site_url,
        })
    } else {
        Err(errors)
    }
}

pub(crate) async fn settings_form(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SettingsQuery>,
) -> Result<Response, PageError> {
    user.require(Role::Admin)?;
    let settings = state.content.load_settings().await?;
    let notice = if query.saved.as_deref() == Some("1") {
        "Settings saved."
    } else {
        ""
    };

    render(
        StatusCode::OK,
        &SettingsTemplate {
            notice,
            errors: &[],
            site_name: &settings.site_name,
            contact_email: &settings.contact_email,
            site_url: &settings.site_url,
            csrf_token: &user.csrf_token,
            logout_url: ADMIN_LOGOUT_URL.as_str(),
        },
    )
}

pub(crate) async fn settings_save(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<SettingsForm>,
) -> Result<Response, PageError> {
    user.require(Role::Admin)?;
    user.verify_csrf(&form.csrf_token).await?;

    match validate_settings_form(&form) {
        Ok(settings) => {
            state.content.save_settings(&settings).await?;
            tracing::info!(user_id = user.user_id, "Site settings updated");
            Ok(Redirect::to("/console/settings?saved=1").into_response())
        }
        Err(errors) => render(
            StatusCode::UNPROCESSABLE_ENTITY,
            &SettingsTemplate {
                notice: "",
                errors: &errors,
                site_name: &form.site_name,
                contact_email: &form.contact_email,
                site_url: &form.site_url,
                csrf_token: &user.csrf_token,
                logout_url: ADMIN_LOGOUT_URL.as_str(),
            },
        ),
    }
}
