use http::header::{COOKIE, HeaderMap};

use crate::session::config::{SESSION_COOKIE_NAME, SESSION_COOKIE_SECURE, SESSION_STORE_TTL};
use crate::session::errors::SessionError;
use crate::session::types::Session;
use crate::utils::header_set_cookie;

/// `Set-Cookie` header carrying the session id, refreshed on every response.
pub fn session_cookie_headers(session: &Session) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        SESSION_COOKIE_NAME.as_str(),
        session.id(),
        i64::try_from(*SESSION_STORE_TTL).unwrap_or(i64::MAX),
        *SESSION_COOKIE_SECURE,
    )?;
    Ok(headers)
}

/// Extract the session id from the request's `Cookie` headers, if present.
pub fn get_session_id_from_headers(headers: &HeaderMap) -> Result<Option<&str>, SessionError> {
    find_cookie(headers, SESSION_COOKIE_NAME.as_str())
}

fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, SessionError> {
    for value in headers.get_all(COOKIE) {
        let cookie_str = value.to_str().map_err(|e| {
            tracing::error!("Invalid cookie header: {}", e);
            SessionError::Cookie("Invalid cookie header".to_string())
        })?;

        let found = cookie_str.split(';').map(str::trim).find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == name && !v.is_empty()).then_some(v)
        });
        if found.is_some() {
            return Ok(found);
        }
    }

    tracing::debug!("No session cookie '{}' found in cookies", name);
    Ok(None)
}
