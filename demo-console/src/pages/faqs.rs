use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use admin_gate::{Role, sanitize_text, validate_integer};
use admin_gate_axum::{ADMIN_LOGOUT_URL, AuthUser};

use super::{PageError, render};
use crate::AppState;
use crate::content::{Faq, FaqInput};

const QUESTION_MAX_LENGTH: usize = 255;
const ANSWER_MAX_LENGTH: usize = 5000;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FaqForm {
    #[serde(default)]
    csrf_token: String,
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    sort_order: String,
}

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    saved: Option<String>,
}

#[derive(Template)]
#[template(path = "faqs.html")]
struct FaqListTemplate<'a> {
    faqs: &'a [Faq],
    notice: &'a str,
    errors: &'a [&'static str],
    form: &'a FaqForm,
    csrf_token: &'a str,
    logout_url: &'a str,
}

#[derive(Template)]
#[template(path = "faq_edit.html")]
struct FaqEditTemplate<'a> {
    id: i64,
    errors: &'a [&'static str],
    form: &'a FaqForm,
    csrf_token: &'a str,
    logout_url: &'a str,
}

/// Sanitize and check the submitted fields.
fn validate_faq_form(form: &FaqForm) -> Result<FaqInput, Vec<&'static str>> {
    let mut errors = Vec::new();

    let question = sanitize_text(&form.question, Some(QUESTION_MAX_LENGTH));
    if question.is_empty() {
        errors.push("Question is required.");
    }
    let answer = sanitize_text(&form.answer, Some(ANSWER_MAX_LENGTH));
    if answer.is_empty() {
        errors.push("Answer is required.");
    }
    let sort_order = if form.sort_order.trim().is_empty() {
        Some(1)
    } else {
        validate_integer(&form.sort_order)
    };
    if sort_order.is_none() {
        errors.push("Sort order must be a positive whole number.");
    }

    match sort_order {
        Some(sort_order) if errors.is_empty() => Ok(FaqInput {
            question,
            answer,
            sort_order,
        }),
        _ => Err(errors),
    }
}

async fn render_list(
    state: &AppState,
    user: &AuthUser,
    status: StatusCode,
    notice: &str,
    errors: &[&'static str],
    form: &FaqForm,
) -> Result<Response, PageError> {
    let faqs = state.content.list_faqs().await?;
    render(
        status,
        &FaqListTemplate {
            faqs: &faqs,
            notice,
            errors,
            form,
            csrf_token: &user.csrf_token,
            logout_url: ADMIN_LOGOUT_URL.as_str(),
        },
    )
}

pub(crate) async fn faq_list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Response, PageError> {
    user.require(Role::Editor)?;
    let notice = match query.saved.as_deref() {
        Some("1") => "Saved.",
        Some("deleted") => "Deleted.",
        _ => "",
    };
    render_list(&state, &user, StatusCode::OK, notice, &[], &FaqForm::default()).await
}

pub(crate) async fn faq_create(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<FaqForm>,
) -> Result<Response, PageError> {
    user.require(Role::Editor)?;
    user.verify_csrf(&form.csrf_token).await?;

    match validate_faq_form(&form) {
        Ok(input) => {
            let id = state.content.create_faq(&input).await?;
            tracing::info!(faq_id = id, user_id = user.user_id, "FAQ created");
            Ok(Redirect::to("/console/faqs?saved=1").into_response())
        }
        Err(errors) => {
            render_list(
                &state,
                &user,
                StatusCode::UNPROCESSABLE_ENTITY,
                "",
                &errors,
                &form,
            )
            .await
        }
    }
}

pub(crate) async fn faq_edit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    user.require(Role::Editor)?;
    let faq = state.content.get_faq(id).await?.ok_or(PageError::NotFound)?;
    let form = FaqForm {
        csrf_token: String::new(),
        question: faq.question,
        answer: faq.answer,
        sort_order: faq.sort_order.to_string(),
    };
    render(
        StatusCode::OK,
        &FaqEditTemplate {
            id,
            errors: &[],
            form: &form,
            csrf_token: &user.csrf_token,
            logout_url: ADMIN_LOGOUT_URL.as_str(),
        },
    )
}

pub(crate) async fn faq_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Form(form): Form<FaqForm>,
) -> Result<Response, PageError> {
    user.require(Role::Editor)?;
    user.verify_csrf(&form.csrf_token).await?;

    match validate_faq_form(&form) {
        Ok(input) => {
            if !state.content.update_faq(id, &input).await? {
                return Err(PageError::NotFound);
            }
            tracing::info!(faq_id = id, user_id = user.user_id, "FAQ updated");
            Ok(Redirect::to("/console/faqs?saved=1").into_response())
        }
        Err(errors) => render(
            StatusCode::UNPROCESSABLE_ENTITY,
            &FaqEditTemplate {
                id,
                errors: &errors,
                form: &form,
                csrf_token: &user.csrf_token,
                logout_url: ADMIN_LOGOUT_URL.as_str(),
            },
        ),
    }
}

#[derive(Deserialize)]
pub(crate) struct DeleteForm {
    #[serde(default)]
    csrf_token: String,
}

pub(crate) async fn faq_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, PageError> {
    user.require(Role::Editor)?;
    user.verify_csrf(&form.csrf_token).await?;

    if !state.content.delete_faq(id).await? {
        return Err(PageError::NotFound);
    }
    tracing::info!(faq_id = id, user_id = user.user_id, "FAQ deleted");
    Ok(Redirect::to("/console/faqs?saved=deleted").into_response())
}
