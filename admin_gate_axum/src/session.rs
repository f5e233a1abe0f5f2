use std::sync::Arc;

use admin_gate::{AuthError, Principal, Role, Session, require_role, validate_token};
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use chrono::Utc;
use http::{StatusCode, request::Parts};
use tokio::sync::{Mutex, MutexGuard};

use crate::error::AuthRejection;

/// The request's session, loaded by `session_middleware` and saved after the handler returns.
#[derive(Clone, Debug)]
pub struct SessionHandle(Arc<Mutex<Session>>);

impl SessionHandle {
    pub(crate) fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().await
    }
}

impl<S> FromRequestParts<S> for SessionHandle
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<SessionHandle>().cloned().ok_or_else(|| {
            tracing::error!("SessionHandle missing; is session_middleware installed?");
            (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable")
        })
    }
}

/// Outcome of the idle-timeout guard for this request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionLiveness {
    Alive,
    Expired,
}

/// Client address used for rate limiting and security logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientAddress(pub String);

impl<S> FromRequestParts<S> for ClientAddress
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<ClientAddress>()
            .cloned()
            .unwrap_or_else(|| ClientAddress("unknown".to_string())))
    }
}

/// Signed-in console user, available as an axum extractor behind `require_login`.
///
/// `csrf_token` is the session's current token for embedding in forms.
/// Form posts must still call [`AuthUser::verify_csrf`] with the submitted
/// field unless the token already arrived in an `X-CSRF-Token` header.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
    pub display_name: String,
    pub csrf_token: String,
    pub csrf_via_header_verified: bool,
    pub(crate) session: SessionHandle,
}

impl AuthUser {
    pub(crate) fn new(principal: Principal, csrf_token: String, session: SessionHandle) -> Self {
        Self {
            user_id: principal.user_id,
            role: principal.role,
            display_name: principal.display_name,
            csrf_token,
            csrf_via_header_verified: false,
            session,
        }
    }

    /// Check a CSRF token submitted in a form body.
    pub async fn verify_csrf(&self, submitted: &str) -> Result<(), AuthRejection> {
        if self.csrf_via_header_verified {
            return Ok(());
        }
        let session = self.session.lock().await;
        if validate_token(&session, submitted, Utc::now()) {
            Ok(())
        } else {
            tracing::warn!(user_id = self.user_id, "CSRF validation failed for form submission");
            Err(AuthRejection(AuthError::InvalidCsrf))
        }
    }

    pub fn require(&self, role: Role) -> Result<(), AuthRejection> {
        let principal = Principal {
            user_id: self.user_id,
            role: self.role,
            display_name: self.display_name.clone(),
        };
        require_role(&principal, role).map_err(AuthRejection)
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            tracing::debug!("No AuthUser in request extensions");
            AuthRejection(AuthError::Unauthorized)
        })
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthUser>().cloned())
    }
}
