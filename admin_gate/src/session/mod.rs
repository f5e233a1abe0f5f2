pub(crate) mod config;
mod errors;
mod main;
mod types;

pub use config::{
    CSRF_TOKEN_TTL_SECONDS, SESSION_COOKIE_NAME, SESSION_COOKIE_SECURE, SESSION_IDLE_TIMEOUT,
    SESSION_STORE_TTL,
};
pub use errors::SessionError;
pub use types::{
    CsrfToken, Principal, RateLimitDecision, RateLimitEntry, RateLimitKey, Role, Session,
};

pub use main::{
    check_and_record, clear_rate_limit, get_session_id_from_headers, is_session_alive,
    issue_or_reuse_token, load_session, rotate_csrf_token, save_session, session_cookie_headers,
    validate_token,
};
