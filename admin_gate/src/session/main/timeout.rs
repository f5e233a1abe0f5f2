use chrono::{DateTime, Duration, Utc};

use crate::session::types::Session;

/// Decide whether the session survives this request.
///
/// A session with no recorded activity starts its clock now. A session idle for
/// longer than `timeout_seconds` is cleared and reported dead; its id is
/// replaced when it is next saved. Any other session has its activity refreshed.
/// Call once per request, before looking at the principal.
pub fn is_session_alive(session: &mut Session, timeout_seconds: u64, now: DateTime<Utc>) -> bool {
    let Some(last_activity) = session.last_activity else {
        session.last_activity = Some(now);
        return true;
    };

    let timeout = i64::try_from(timeout_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX);
    if now - last_activity > timeout {
        tracing::info!(
            user_id = session.principal.as_ref().map(|p| p.user_id),
            last_activity = %last_activity,
            at = %now,
            "Session expired after idle timeout"
        );
        session.clear(now);
        return false;
    }

    session.last_activity = Some(now);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::{Principal, Role};

    const TIMEOUT: u64 = 1800;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-07-04T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn active_session() -> Session {
        let mut s = Session::with_id("sid".to_string(), t0());
        s.last_activity = Some(t0());
        s.principal = Some(Principal {
            user_id: 3,
            role: Role::Viewer,
            display_name: "Vi".to_string(),
        });
        s
    }

    #[test]
    fn test_first_touch_initializes_activity() {
        let mut s = Session::with_id("sid".to_string(), t0());

        assert!(is_session_alive(&mut s, TIMEOUT, t0()));
        assert_eq!(s.last_activity, Some(t0()));
    }

    #[test]
    fn test_alive_refreshes_activity() {
        let mut s = active_session();
        let later = t0() + Duration::seconds(60);

        assert!(is_session_alive(&mut s, TIMEOUT, later));
        assert_eq!(s.last_activity, Some(later));
    }

    #[test]
    fn test_timeout_boundaries() {
        for (idle, expected) in [(1799, true), (1800, true), (1801, false)] {
            // Given a session last active at t0
            let mut s = active_session();

            // When the guard runs `idle` seconds later
            let alive = is_session_alive(&mut s, TIMEOUT, t0() + Duration::seconds(idle));

            // Then it is alive up to and including the timeout
            assert_eq!(alive, expected, "idle for {idle}s");
        }
    }

    #[test]
    fn test_expired_session_is_cleared() {
        let mut s = active_session();
        s.csrf = Some(crate::session::types::CsrfState {
            token: "t".to_string(),
            issued_at: t0(),
        });
        let later = t0() + Duration::seconds(4000);

        assert!(!is_session_alive(&mut s, TIMEOUT, later));

        assert!(s.principal.is_none());
        assert!(s.csrf.is_none());
        assert!(s.last_activity.is_none());
        assert_eq!(s.created_at, later);
        assert!(s.rotation_pending);
    }

    #[test]
    fn test_guard_after_expiry_starts_fresh_session() {
        let mut s = active_session();
        let later = t0() + Duration::seconds(4000);
        assert!(!is_session_alive(&mut s, TIMEOUT, later));

        // The next request on the same session starts a new clock
        assert!(is_session_alive(&mut s, TIMEOUT, later + Duration::seconds(1)));
        assert!(!s.is_authenticated());
    }
}
