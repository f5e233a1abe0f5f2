use thiserror::Error;

use crate::session::{Role, SessionError};
use crate::userdb::UserError;

/// Failures surfaced by the login flow and the page gate.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("CSRF token missing, expired or mismatched")]
    InvalidCsrf,

    #[error("Too many attempts, retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session expired")]
    SessionExpired,

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Role {required} required")]
    Forbidden { required: Role },

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("User error: {0}")]
    User(#[from] UserError),
}

impl AuthError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::InvalidCsrf => tracing::warn!("Rejected request with invalid CSRF token"),
            Self::RateLimited {
                retry_after_seconds,
            } => tracing::warn!(retry_after_seconds, "Rate limit exceeded"),
            Self::InvalidCredentials => tracing::warn!("Invalid credentials"),
            Self::SessionExpired => tracing::info!("Session expired"),
            Self::Unauthorized => tracing::debug!("Unauthenticated access"),
            Self::Forbidden { required } => {
                tracing::warn!(required = %required, "Insufficient role")
            }
            Self::Session(err) => tracing::error!("Session error: {}", err),
            Self::User(err) => tracing::error!("User error: {}", err),
        }
        self
    }

    /// Text safe to show to the client. Internal details never appear here.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCsrf => "Security token invalid, please retry.".to_string(),
            Self::RateLimited {
                retry_after_seconds,
            } => format!(
                "Too many login attempts. Please try again in {} minutes.",
                retry_after_seconds.div_ceil(60).max(1)
            ),
            Self::InvalidCredentials => "Invalid username or password.".to_string(),
            Self::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            Self::Unauthorized => "Please log in to continue.".to_string(),
            Self::Forbidden { .. } => "You do not have permission to access this page.".to_string(),
            Self::Session(_) | Self::User(_) => "Something went wrong, please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_rounds_up_to_minutes() {
        let five = AuthError::RateLimited {
            retry_after_seconds: 300,
        };
        let partial = AuthError::RateLimited {
            retry_after_seconds: 61,
        };
        let short = AuthError::RateLimited {
            retry_after_seconds: 5,
        };

        assert_eq!(
            five.user_message(),
            "Too many login attempts. Please try again in 5 minutes."
        );
        assert!(partial.user_message().contains("in 2 minutes"));
        assert!(short.user_message().contains("in 1 minutes"));
    }

    #[test]
    fn test_internal_errors_are_not_reflected() {
        let err = AuthError::from(UserError::Storage("connection refused at 10.0.0.5".to_string()));

        assert!(!err.user_message().contains("10.0.0.5"));
        assert!(err.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            AuthError::InvalidCsrf.user_message(),
            "Security token invalid, please retry."
        );
        assert_eq!(
            AuthError::InvalidCredentials.user_message(),
            "Invalid username or password."
        );
        assert_eq!(
            AuthError::SessionExpired.user_message(),
            "Your session has expired. Please log in again."
        );
    }

    #[test]
    fn test_log_returns_self() {
        let err = AuthError::Forbidden {
            required: Role::Admin,
        }
        .log();
        assert!(matches!(
            err,
            AuthError::Forbidden {
                required: Role::Admin
            }
        ));
    }
}
