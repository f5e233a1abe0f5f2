use chrono::{DateTime, Duration, Utc};

use crate::session::types::{RateLimitDecision, RateLimitEntry, RateLimitKey, Session};

/// Count one attempt of `action` from `client` against a fixed window.
///
/// A missing entry, or one whose window has ended, restarts at one attempt with
/// a new window. Otherwise the attempt is counted and allowed while the count
/// stays within `max_attempts`. Denials report the full window length as the
/// retry hint.
pub fn check_and_record(
    session: &mut Session,
    action: &str,
    client: &str,
    max_attempts: u32,
    window_seconds: u64,
    now: DateTime<Utc>,
) -> RateLimitDecision {
    // Entries for other keys whose window already ended carry no information.
    session
        .rate_limits
        .retain(|_, entry| now < entry.window_ends_at);

    let window = i64::try_from(window_seconds)
        .ok()
        .and_then(Duration::try_seconds);
    let key = RateLimitKey::new(action, client);

    match session.rate_limits.get_mut(&key) {
        Some(entry) => {
            entry.attempts = entry.attempts.saturating_add(1);
            if entry.attempts <= max_attempts {
                RateLimitDecision::Allowed
            } else {
                tracing::warn!(
                    action,
                    client,
                    attempts = entry.attempts,
                    at = %now,
                    "Rate limit exceeded"
                );
                RateLimitDecision::Denied {
                    retry_after_seconds: window_seconds,
                }
            }
        }
        None => {
            session.rate_limits.insert(
                key,
                RateLimitEntry {
                    attempts: 1,
                    window_ends_at: window
                        .and_then(|w| now.checked_add_signed(w))
                        .unwrap_or(DateTime::<Utc>::MAX_UTC),
                },
            );
            if max_attempts == 0 {
                tracing::warn!(action, client, at = %now, "Rate limit allows no attempts");
                return RateLimitDecision::Denied {
                    retry_after_seconds: window_seconds,
                };
            }
            RateLimitDecision::Allowed
        }
    }
}

/// Forget the counter for `action` from `client`.
pub fn clear_rate_limit(session: &mut Session, action: &str, client: &str) {
    session.rate_limits.remove(&RateLimitKey::new(action, client));
}
