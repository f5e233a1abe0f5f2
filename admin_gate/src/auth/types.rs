use subtle::ConstantTimeEq;

use crate::session::{Principal, Role};

/// Submitted login form fields.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Single fallback credential, consulted only when the user lookup itself fails.
#[derive(Clone)]
pub struct BootstrapCredential {
    pub enabled: bool,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapCredential")
            .field("enabled", &self.enabled)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BootstrapCredential {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            username: String::new(),
            password: String::new(),
        }
    }

    /// Compare both fields in constant time and yield the bootstrap principal on a match.
    pub(crate) fn authenticate(&self, username: &str, password: &str) -> Option<Principal> {
        if !self.enabled || self.username.is_empty() || self.password.is_empty() {
            return None;
        }

        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        if !bool::from(user_ok & pass_ok) {
            return None;
        }

        Some(Principal {
            user_id: 0,
            role: Role::Admin,
            display_name: "Bootstrap Administrator".to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct LoginPolicy {
    pub max_attempts: u32,
    pub window_seconds: u64,
    pub bootstrap: BootstrapCredential,
}

/// What the gate knows about the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Authenticated(Principal),
    Anonymous,
}
