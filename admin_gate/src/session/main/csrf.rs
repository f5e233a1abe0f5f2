use chrono::{DateTime, Duration, Utc};
use subtle::ConstantTimeEq;

use crate::session::config::{CSRF_TOKEN_BYTES, CSRF_TOKEN_TTL_SECONDS};
use crate::session::errors::SessionError;
use crate::session::types::{CsrfState, CsrfToken, Session};
use crate::utils::gen_random_hex;

fn token_expired(issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - issued_at >= Duration::seconds(CSRF_TOKEN_TTL_SECONDS)
}

/// Return the session's CSRF token, minting a new one when none exists or the
/// current one has reached its expiry age.
pub fn issue_or_reuse_token(
    session: &mut Session,
    now: DateTime<Utc>,
) -> Result<CsrfToken, SessionError> {
    if let Some(state) = &session.csrf {
        if !token_expired(state.issued_at, now) {
            return Ok(CsrfToken::new(state.token.clone()));
        }
        tracing::debug!(issued_at = %state.issued_at, "CSRF token expired, issuing a new one");
    }

    let token = gen_random_hex(CSRF_TOKEN_BYTES)?;
    session.csrf = Some(CsrfState {
        token: token.clone(),
        issued_at: now,
    });
    Ok(CsrfToken::new(token))
}

/// Check a submitted token against the session's token in constant time.
///
/// Missing or expired tokens never validate. This function has no side effects.
pub fn validate_token(session: &Session, candidate: &str, now: DateTime<Utc>) -> bool {
    let Some(state) = &session.csrf else {
        tracing::debug!("No CSRF token stored in session");
        return false;
    };

    if token_expired(state.issued_at, now) {
        tracing::debug!(issued_at = %state.issued_at, "Stored CSRF token has expired");
        return false;
    }

    candidate.as_bytes().ct_eq(state.token.as_bytes()).into()
}

/// Forget the current token; the next `issue_or_reuse_token` mints a fresh one.
pub fn rotate_csrf_token(session: &mut Session) {
    session.csrf = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn session() -> Session {
        Session::with_id("sid".to_string(), t0())
    }

    #[test]
    fn test_issue_creates_hex_token_with_issue_time() {
        // Given a session without a token
        let mut s = session();

        // When a token is issued
        let token = issue_or_reuse_token(&mut s, t0()).unwrap();

        // Then a 64-char hex token is stored with its issue time
        assert_eq!(token.as_str().len(), 64);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        let state = s.csrf.as_ref().unwrap();
        assert_eq!(state.token, token.as_str());
        assert_eq!(state.issued_at, t0());
    }

    #[test]
    fn test_issue_is_idempotent_within_window() {
        let mut s = session();

        let first = issue_or_reuse_token(&mut s, t0()).unwrap();
        let second = issue_or_reuse_token(&mut s, t0() + Duration::seconds(5)).unwrap();

        assert_eq!(first, second);
        assert_eq!(s.csrf.as_ref().unwrap().issued_at, t0());
    }

    #[test]
    fn test_issue_replaces_expired_token() {
        let mut s = session();
        let first = issue_or_reuse_token(&mut s, t0()).unwrap();

        let later = t0() + Duration::seconds(CSRF_TOKEN_TTL_SECONDS);
        let second = issue_or_reuse_token(&mut s, later).unwrap();

        assert_ne!(first, second);
        assert_eq!(s.csrf.as_ref().unwrap().issued_at, later);
    }

    #[test]
    fn test_fresh_token_validates() {
        let mut s = session();
        let token = issue_or_reuse_token(&mut s, t0()).unwrap();

        assert!(validate_token(&s, token.as_str(), t0()));
    }

    #[test]
    fn test_validate_without_token_is_false() {
        let s = session();
        assert!(!validate_token(&s, "anything", t0()));
        assert!(!validate_token(&s, "", t0()));
    }

    #[test]
    fn test_validate_rejects_mismatch_and_prefix() {
        let mut s = session();
        let token = issue_or_reuse_token(&mut s, t0()).unwrap();

        assert!(!validate_token(&s, "deadbeef", t0()));
        assert!(!validate_token(&s, &token.as_str()[..63], t0()));
        assert!(!validate_token(&s, &format!("{}0", token.as_str()), t0()));
        assert!(!validate_token(&s, &token.as_str().to_uppercase(), t0()));
    }

    #[test]
    fn test_validate_expiry_boundary() {
        let mut s = session();
        let token = issue_or_reuse_token(&mut s, t0()).unwrap();

        let just_before = t0() + Duration::seconds(CSRF_TOKEN_TTL_SECONDS - 1);
        let at_expiry = t0() + Duration::seconds(CSRF_TOKEN_TTL_SECONDS);

        assert!(validate_token(&s, token.as_str(), just_before));
        assert!(!validate_token(&s, token.as_str(), at_expiry));
    }

    #[test]
    fn test_validate_has_no_side_effects() {
        let mut s = session();
        issue_or_reuse_token(&mut s, t0()).unwrap();
        let before = s.csrf.clone();

        let _ = validate_token(&s, "wrong", t0() + Duration::seconds(7200));

        assert_eq!(s.csrf, before);
    }

    #[test]
    fn test_rotate_forces_new_token() {
        let mut s = session();
        let first = issue_or_reuse_token(&mut s, t0()).unwrap();

        rotate_csrf_token(&mut s);
        let second = issue_or_reuse_token(&mut s, t0()).unwrap();

        assert_ne!(first, second);
        assert!(!validate_token(&s, first.as_str(), t0()));
    }

    proptest! {
        /// A token validates iff it is less than the expiry window old and matches exactly
        #[test]
        fn prop_validate_iff_fresh_and_equal(
            age in 0i64..(CSRF_TOKEN_TTL_SECONDS * 2),
            tamper in proptest::bool::ANY,
        ) {
            let mut s = session();
            let token = issue_or_reuse_token(&mut s, t0()).unwrap();
            let candidate = if tamper {
                format!("x{}", &token.as_str()[1..])
            } else {
                token.as_str().to_string()
            };

            let valid = validate_token(&s, &candidate, t0() + Duration::seconds(age));

            prop_assert_eq!(valid, age < CSRF_TOKEN_TTL_SECONDS && !tamper);
        }
    }
}
