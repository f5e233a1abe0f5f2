//! Session-scoped request security for server-rendered admin consoles.
//!
//! `admin-gate` keeps one typed [`Session`] per browser and provides the
//! pieces every admin page needs: a per-session CSRF token, a fixed-window
//! rate limiter, an idle-timeout guard, input sanitizers, and a login flow
//! that composes them against a user table.
//!
//! Operations take the session and the current time explicitly. Only
//! [`load_session`] and [`save_session`] touch the configured session backend.
//!
//! ```no_run
//! use admin_gate::{Credentials, is_session_alive, load_session, login, save_session};
//! use chrono::Utc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! admin_gate::init().await?;
//!
//! let now = Utc::now();
//! let mut session = load_session(None, now).await?;
//! if is_session_alive(&mut session, *admin_gate::SESSION_IDLE_TIMEOUT, now) {
//!     let credentials = Credentials {
//!         username: "admin".into(),
//!         password: "secret".into(),
//!     };
//!     let _principal = login(&mut session, &credentials, "203.0.113.9", now).await;
//! }
//! save_session(&mut session).await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod sanitize;
mod session;
mod storage;
mod userdb;
mod utils;

#[cfg(test)]
mod test_utils;

pub use auth::{
    ADMIN_BOOTSTRAP_MODE, AuthError, BootstrapCredential, CredentialStore, Credentials,
    DEFAULT_BOOTSTRAP_PASSWORD, GateOutcome, LOGIN_ACTION, LOGIN_MAX_ATTEMPTS, LOGIN_POLICY,
    LOGIN_WINDOW_SECONDS, LoginPolicy, authorize, login, login_with, logout, require_role,
};

pub use config::ADMIN_ROUTE_PREFIX;

pub use sanitize::{
    sanitize_file_name, sanitize_text, validate_email_address, validate_integer, validate_url,
};

pub use session::{
    CSRF_TOKEN_TTL_SECONDS, CsrfToken, Principal, RateLimitDecision, RateLimitEntry, RateLimitKey,
    Role, SESSION_COOKIE_NAME, SESSION_COOKIE_SECURE, SESSION_IDLE_TIMEOUT, SESSION_STORE_TTL,
    Session, SessionError, check_and_record, clear_rate_limit, get_session_id_from_headers,
    is_session_alive, issue_or_reuse_token, load_session, rotate_csrf_token, save_session,
    session_cookie_headers, validate_token,
};

pub use storage::StorageError;

pub use userdb::{NewUser, User, UserError, UserStatus, UserStore, hash_password, verify_password};

pub use utils::UtilError;

/// Initialize the stores and create the users table
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    storage::init().await?;
    userdb::init().await?;
    Ok(())
}
