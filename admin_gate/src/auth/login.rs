use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::auth::config::{LOGIN_ACTION, LOGIN_POLICY};
use crate::auth::errors::AuthError;
use crate::auth::types::{Credentials, LoginPolicy};
use crate::session::{
    Principal, RateLimitDecision, Session, check_and_record, clear_rate_limit, rotate_csrf_token,
};
use crate::userdb::{User, UserError, UserStore, dummy_verify, verify_password_blocking};

/// Account lookup used by the login flow.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find an account allowed to sign in. `Ok(None)` means no such active account.
    async fn find_active_user(&self, username: &str) -> Result<Option<User>, UserError>;

    async fn record_login(&self, user_id: i64, at: DateTime<Utc>) -> Result<(), UserError>;
}

#[async_trait]
impl CredentialStore for UserStore {
    async fn find_active_user(&self, username: &str) -> Result<Option<User>, UserError> {
        UserStore::find_active_user(username).await
    }

    async fn record_login(&self, user_id: i64, at: DateTime<Utc>) -> Result<(), UserError> {
        UserStore::record_login(user_id, at).await
    }
}

/// Sign in against the configured user store and login policy.
pub async fn login(
    session: &mut Session,
    credentials: &Credentials,
    client: &str,
    now: DateTime<Utc>,
) -> Result<Principal, AuthError> {
    login_with(&UserStore, &LOGIN_POLICY, session, credentials, client, now).await
}

/// Sign in with an explicit store and policy.
///
/// Every call counts against the login rate limit for `client`, which is
/// checked before any credential work. On success the session moves to a new
/// id, receives the principal, gets a fresh CSRF token on next issue, and the
/// client's login counter is cleared. The bootstrap credential is consulted
/// only when the account lookup fails outright.
#[tracing::instrument(skip(store, policy, session, credentials), fields(username = %credentials.username))]
pub async fn login_with<S>(
    store: &S,
    policy: &LoginPolicy,
    session: &mut Session,
    credentials: &Credentials,
    client: &str,
    now: DateTime<Utc>,
) -> Result<Principal, AuthError>
where
    S: CredentialStore + ?Sized,
{
    if let RateLimitDecision::Denied {
        retry_after_seconds,
    } = check_and_record(
        session,
        LOGIN_ACTION,
        client,
        policy.max_attempts,
        policy.window_seconds,
        now,
    ) {
        return Err(AuthError::RateLimited {
            retry_after_seconds,
        }
        .log());
    }

    let username = credentials.username.trim();
    if username.is_empty() || credentials.password.is_empty() {
        tracing::warn!(action = LOGIN_ACTION, client, at = %now, "Login with empty field");
        return Err(AuthError::InvalidCredentials);
    }

    let (principal, from_store) = match store.find_active_user(username).await {
        Ok(Some(user)) => {
            if !verify_password_blocking(&credentials.password, &user.password_hash).await {
                tracing::warn!(action = LOGIN_ACTION, client, at = %now, "Password mismatch");
                return Err(AuthError::InvalidCredentials);
            }
            (user.to_principal().map_err(|e| AuthError::from(e).log())?, true)
        }
        Ok(None) => {
            dummy_verify(&credentials.password).await;
            tracing::warn!(action = LOGIN_ACTION, client, at = %now, "Unknown or inactive account");
            return Err(AuthError::InvalidCredentials);
        }
        Err(e) => {
            tracing::error!(
                action = LOGIN_ACTION,
                client,
                at = %now,
                error = %e,
                "Account lookup failed"
            );
            match policy
                .bootstrap
                .authenticate(username, &credentials.password)
            {
                Some(principal) => {
                    tracing::warn!(action = LOGIN_ACTION, client, at = %now, "Bootstrap login accepted");
                    (principal, false)
                }
                None => return Err(AuthError::InvalidCredentials),
            }
        }
    };

    establish_session(session, &principal, client, now)?;

    if from_store {
        if let Err(e) = store.record_login(principal.user_id, now).await {
            tracing::error!(user_id = principal.user_id, error = %e, "Failed to record last login");
        }
    }

    tracing::info!(
        user_id = principal.user_id,
        role = %principal.role,
        client,
        "Login succeeded"
    );
    Ok(principal)
}

fn establish_session(
    session: &mut Session,
    principal: &Principal,
    client: &str,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    session.rotate_id()?;
    session.principal = Some(principal.clone());
    session.created_at = now;
    session.last_activity = Some(now);
    rotate_csrf_token(session);
    clear_rate_limit(session, LOGIN_ACTION, client);
    Ok(())
}
