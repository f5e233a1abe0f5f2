//! URLs and request handling switches for the axum integration

use std::sync::LazyLock;

use admin_gate::ADMIN_ROUTE_PREFIX;

/// Login page. Default: "{ADMIN_ROUTE_PREFIX}/login"
pub static ADMIN_LOGIN_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("ADMIN_LOGIN_URL").unwrap_or_else(|_| format!("{}/login", *ADMIN_ROUTE_PREFIX))
});

/// Logout endpoint (POST). Default: "{ADMIN_ROUTE_PREFIX}/logout"
pub static ADMIN_LOGOUT_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("ADMIN_LOGOUT_URL").unwrap_or_else(|_| format!("{}/logout", *ADMIN_ROUTE_PREFIX))
});

/// Where a successful login lands when no `next` path was carried. Default: "/"
pub static ADMIN_REDIRECT_AFTER_LOGIN: LazyLock<String> = LazyLock::new(|| {
    std::env::var("ADMIN_REDIRECT_AFTER_LOGIN").unwrap_or_else(|_| "/".to_string())
});

/// Take the client address from `X-Forwarded-For`. Enable only behind a proxy you control.
pub static ADMIN_TRUST_FORWARDED_FOR: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("ADMIN_TRUST_FORWARDED_FOR")
        .map(|val| val.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

/// Login URL for a session that just expired.
pub(crate) fn expired_login_url() -> String {
    format!("{}?expired=1", ADMIN_LOGIN_URL.as_str())
}

/// Login URL that returns the user to `path` afterwards.
pub(crate) fn login_url_with_next(path: &str) -> String {
    format!(
        "{}?next={}",
        ADMIN_LOGIN_URL.as_str(),
        urlencoding::encode(path)
    )
}

/// Accept only same-site absolute paths as post-login targets.
pub(crate) fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|path| {
        path.starts_with('/')
            && !path.starts_with("//")
            && !path.contains('\\')
            && !path.chars().any(char::is_control)
    })
}
