use std::sync::LazyLock;

/// Age at which a CSRF token stops validating and is replaced on next issue.
pub const CSRF_TOKEN_TTL_SECONDS: i64 = 3600;

pub(crate) const CSRF_TOKEN_BYTES: usize = 32;
pub(crate) const SESSION_ID_BYTES: usize = 32;

pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("admin_session".to_string())
});

/// Whether the session cookie carries the `Secure` attribute. Default: true.
pub static SESSION_COOKIE_SECURE: LazyLock<bool> =
    LazyLock::new(|| parse_bool(std::env::var("SESSION_COOKIE_SECURE").ok(), true));

/// Idle time in seconds after which the timeout guard destroys a session.
pub static SESSION_IDLE_TIMEOUT: LazyLock<u64> =
    LazyLock::new(|| parse_u64(std::env::var("SESSION_IDLE_TIMEOUT").ok(), 1800));

/// Backend TTL and cookie Max-Age. Twice the idle timeout so that expiry is
/// decided by the timeout guard, which can report it, rather than by eviction.
pub static SESSION_STORE_TTL: LazyLock<u64> =
    LazyLock::new(|| SESSION_IDLE_TIMEOUT.saturating_mul(2));

pub(crate) fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value {
        Some(v) => match v.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

pub(crate) fn parse_u64(value: Option<String>, default: u64) -> u64 {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_defaults_when_unset() {
        assert!(parse_bool(None, true));
        assert!(!parse_bool(None, false));
    }

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        for v in ["true", "TRUE", "1", "yes", " on "] {
            assert!(parse_bool(Some(v.to_string()), false), "{v}");
        }
        for v in ["false", "False", "0", "no", "off"] {
            assert!(!parse_bool(Some(v.to_string()), true), "{v}");
        }
    }

    #[test]
    fn test_parse_bool_falls_back_on_garbage() {
        assert!(parse_bool(Some("maybe".to_string()), true));
        assert!(!parse_bool(Some("maybe".to_string()), false));
    }

    #[test]
    fn test_parse_u64() {
        assert_eq!(parse_u64(None, 1800), 1800);
        assert_eq!(parse_u64(Some("900".to_string()), 1800), 900);
        assert_eq!(parse_u64(Some("invalid".to_string()), 1800), 1800);
        assert_eq!(parse_u64(Some("-5".to_string()), 1800), 1800);
    }
}
