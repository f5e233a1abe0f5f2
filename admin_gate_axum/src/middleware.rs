use std::net::{IpAddr, SocketAddr};

use admin_gate::{
    AuthError, GateOutcome, SESSION_IDLE_TIMEOUT, authorize, get_session_id_from_headers,
    is_session_alive, issue_or_reuse_token, load_session, save_session, session_cookie_headers,
    validate_token,
};
use axum::{
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use http::{HeaderMap, Method, header::CONTENT_TYPE};

use crate::config::{ADMIN_TRUST_FORWARDED_FOR, expired_login_url, login_url_with_next};
use crate::error::AuthRejection;
use crate::session::{AuthUser, ClientAddress, SessionHandle, SessionLiveness};

const GENERIC_ERROR: &str = "Something went wrong, please try again.";

/// First `X-Forwarded-For` hop, accepted only when it parses as an IP address.
fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
        .map(|ip| ip.to_string())
}

fn client_address(req: &Request) -> String {
    if *ADMIN_TRUST_FORWARDED_FOR {
        if let Some(addr) = forwarded_client(req.headers()) {
            return addr;
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Load the session for every request, run the idle-timeout guard once, and
/// persist the session with a refreshed cookie after the handler.
///
/// Adds [`SessionHandle`], [`SessionLiveness`] and [`ClientAddress`] to the
/// request extensions.
pub async fn session_middleware(mut req: Request, next: Next) -> Response {
    let now = Utc::now();

    let session_id = match get_session_id_from_headers(req.headers()) {
        Ok(id) => id.map(str::to_string),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable cookie header");
            None
        }
    };

    let mut session = match load_session(session_id.as_deref(), now).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load session");
            return (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR).into_response();
        }
    };

    let liveness = if is_session_alive(&mut session, *SESSION_IDLE_TIMEOUT, now) {
        SessionLiveness::Alive
    } else {
        SessionLiveness::Expired
    };

    let handle = SessionHandle::new(session);
    let client = ClientAddress(client_address(&req));
    req.extensions_mut().insert(handle.clone());
    req.extensions_mut().insert(liveness);
    req.extensions_mut().insert(client);

    let mut response = next.run(req).await;

    let mut session = handle.lock().await;
    if let Err(e) = save_session(&mut session).await {
        tracing::error!(error = %e, "Failed to save session");
        return (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR).into_response();
    }

    match session_cookie_headers(&session) {
        Ok(headers) => {
            for (name, value) in headers.iter() {
                response.headers_mut().append(name.clone(), value.clone());
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to build session cookie"),
    }
    response
}

fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::DELETE | Method::PATCH
    )
}

fn is_form_like(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|ct| {
            ct.starts_with("application/x-www-form-urlencoded")
                || ct.starts_with("multipart/form-data")
        })
}

/// Gate console pages behind a signed-in session.
///
/// Expired sessions go to the login page with `?expired=1`; anonymous GETs go
/// to the login page carrying the requested path. For state-changing methods
/// an `X-CSRF-Token` header must match the session token; without the header
/// only form posts pass, leaving the form field to [`AuthUser::verify_csrf`].
pub async fn require_login(mut req: Request, next: Next) -> Response {
    let Some(handle) = req.extensions().get::<SessionHandle>().cloned() else {
        tracing::error!("require_login used without session_middleware");
        return (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR).into_response();
    };

    if req.extensions().get::<SessionLiveness>() == Some(&SessionLiveness::Expired) {
        return Redirect::to(&expired_login_url()).into_response();
    }

    let now = Utc::now();
    let method = req.method().clone();
    let client = req
        .extensions()
        .get::<ClientAddress>()
        .map(|c| c.0.clone())
        .unwrap_or_default();

    let auth_user = {
        let mut session = handle.lock().await;

        let principal = match authorize(&session) {
            GateOutcome::Authenticated(principal) => principal,
            GateOutcome::Anonymous => {
                drop(session);
                return if method == Method::GET || method == Method::HEAD {
                    let path = req
                        .uri()
                        .path_and_query()
                        .map(|pq| pq.as_str())
                        .unwrap_or("/");
                    Redirect::to(&login_url_with_next(path)).into_response()
                } else {
                    AuthRejection(AuthError::Unauthorized.log()).into_response()
                };
            }
        };

        let mut csrf_via_header_verified = false;
        if is_state_changing(&method) {
            match req.headers().get("X-CSRF-Token").and_then(|h| h.to_str().ok()) {
                Some(header_token) => {
                    if !validate_token(&session, header_token, now) {
                        tracing::warn!(
                            action = %method,
                            client = %client,
                            at = %now,
                            user_id = principal.user_id,
                            "CSRF token mismatch (X-CSRF-Token)"
                        );
                        return AuthRejection(AuthError::InvalidCsrf).into_response();
                    }
                    csrf_via_header_verified = true;
                }
                None if is_form_like(req.headers()) => {
                    tracing::trace!("No X-CSRF-Token header; form field check left to handler");
                }
                None => {
                    tracing::warn!(
                        action = %method,
                        client = %client,
                        at = %now,
                        "X-CSRF-Token header missing on non-form request"
                    );
                    return AuthRejection(AuthError::InvalidCsrf).into_response();
                }
            }
        }

        let token = match issue_or_reuse_token(&mut session, now) {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "Failed to issue CSRF token");
                return (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR).into_response();
            }
        };

        let mut user = AuthUser::new(principal, token.as_str().to_string(), handle.clone());
        user.csrf_via_header_verified = csrf_via_header_verified;
        user
    };

    tracing::debug!(user_id = auth_user.user_id, role = %auth_user.role, "Authenticated request");
    req.extensions_mut().insert(auth_user);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_is_state_changing() {
        assert!(is_state_changing(&Method::POST));
        assert!(is_state_changing(&Method::DELETE));
        assert!(!is_state_changing(&Method::GET));
        assert!(!is_state_changing(&Method::HEAD));
    }

    #[test]
    fn test_is_form_like() {
        let mut headers = HeaderMap::new();
        assert!(!is_form_like(&headers));

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        assert!(is_form_like(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(!is_form_like(&headers));
    }

    #[test]
    fn test_client_address_from_connect_info() {
        let mut req = Request::builder().uri("/").body(axum::body::Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 7], 50000))));

        assert_eq!(client_address(&req), "192.0.2.7");
    }

    #[test]
    fn test_forwarded_client_accepts_only_ip_addresses() {
        let forwarded = |value: &'static str| {
            let mut headers = HeaderMap::new();
            headers.insert("x-forwarded-for", HeaderValue::from_static(value));
            forwarded_client(&headers)
        };

        assert_eq!(forwarded("203.0.113.9, 10.0.0.1").as_deref(), Some("203.0.113.9"));
        assert_eq!(forwarded(" 2001:db8::1 ").as_deref(), Some("2001:db8::1"));
        assert_eq!(forwarded("login|203.0.113.9"), None);
        assert_eq!(forwarded("not-an-address"), None);
        assert_eq!(forwarded(""), None);
        assert_eq!(forwarded_client(&HeaderMap::new()), None);
    }

    #[test]
    fn test_client_address_unknown_without_connect_info() {
        let req = Request::builder().uri("/").body(axum::body::Body::empty()).unwrap();
        let addr = client_address(&req);
        // X-Forwarded-For is absent, so only ConnectInfo could supply an address
        assert_eq!(addr, "unknown");
    }
}
