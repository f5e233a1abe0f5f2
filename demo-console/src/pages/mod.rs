mod dashboard;
mod faqs;
mod settings;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use admin_gate_axum::AuthRejection;

pub(crate) use dashboard::{dashboard, index};
pub(crate) use faqs::{faq_create, faq_delete, faq_edit, faq_list, faq_update};
pub(crate) use settings::{settings_form, settings_save};

/// Failure modes of the console pages.
#[derive(Debug)]
pub(crate) enum PageError {
    Auth(AuthRejection),
    NotFound,
    Internal,
}

impl From<AuthRejection> for PageError {
    fn from(err: AuthRejection) -> Self {
        Self::Auth(err)
    }
}

impl From<sqlx::Error> for PageError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Content store error");
        Self::Internal
    }
}

impl From<askama::Error> for PageError {
    fn from(err: askama::Error) -> Self {
        tracing::error!(error = %err, "Template rendering error");
        Self::Internal
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(rejection) => rejection.into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong, please try again.",
            )
                .into_response(),
        }
    }
}

fn render<T: Template>(status: StatusCode, template: &T) -> Result<Response, PageError> {
    Ok((status, Html(template.render()?)).into_response())
}
