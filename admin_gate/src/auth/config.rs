use std::{env, sync::LazyLock};

use crate::auth::types::{BootstrapCredential, LoginPolicy};
use crate::session::config::{parse_bool, parse_u64};

/// Rate-limit action name for login attempts.
pub const LOGIN_ACTION: &str = "login";

/// Bootstrap password used when `ADMIN_BOOTSTRAP_PASSWORD` is unset.
/// Only ever accepted with `ADMIN_BOOTSTRAP_MODE=true` and an unreachable user store.
pub const DEFAULT_BOOTSTRAP_PASSWORD: &str = "change-me-before-deploying";

pub static LOGIN_MAX_ATTEMPTS: LazyLock<u32> = LazyLock::new(|| {
    let attempts = parse_u64(env::var("LOGIN_MAX_ATTEMPTS").ok(), 5);
    u32::try_from(attempts).unwrap_or(u32::MAX)
});

pub static LOGIN_WINDOW_SECONDS: LazyLock<u64> =
    LazyLock::new(|| parse_u64(env::var("LOGIN_WINDOW_SECONDS").ok(), 300));

pub static ADMIN_BOOTSTRAP_MODE: LazyLock<bool> =
    LazyLock::new(|| parse_bool(env::var("ADMIN_BOOTSTRAP_MODE").ok(), false));

static ADMIN_BOOTSTRAP_USERNAME: LazyLock<String> = LazyLock::new(|| {
    env::var("ADMIN_BOOTSTRAP_USERNAME").unwrap_or_else(|_| "admin".to_string())
});

static ADMIN_BOOTSTRAP_PASSWORD: LazyLock<String> = LazyLock::new(|| {
    env::var("ADMIN_BOOTSTRAP_PASSWORD").unwrap_or_else(|_| DEFAULT_BOOTSTRAP_PASSWORD.to_string())
});

/// Process-wide login policy read from the environment.
pub static LOGIN_POLICY: LazyLock<LoginPolicy> = LazyLock::new(|| {
    let policy = LoginPolicy::from_env();
    if policy.bootstrap.enabled {
        tracing::warn!(
            username = %policy.bootstrap.username,
            "Bootstrap login is enabled; it is accepted only while the user store is unavailable"
        );
    }
    policy
});

impl LoginPolicy {
    pub fn from_env() -> Self {
        Self {
            max_attempts: *LOGIN_MAX_ATTEMPTS,
            window_seconds: *LOGIN_WINDOW_SECONDS,
            bootstrap: BootstrapCredential {
                enabled: *ADMIN_BOOTSTRAP_MODE,
                username: ADMIN_BOOTSTRAP_USERNAME.clone(),
                password: ADMIN_BOOTSTRAP_PASSWORD.clone(),
            },
        }
    }
}
