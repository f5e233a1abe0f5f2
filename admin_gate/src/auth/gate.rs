use chrono::{DateTime, Utc};

use crate::auth::errors::AuthError;
use crate::auth::types::GateOutcome;
use crate::session::{Principal, Role, Session};

/// Report who, if anyone, the session belongs to.
///
/// Run `is_session_alive` first; an expired session has no principal left.
pub fn authorize(session: &Session) -> GateOutcome {
    match session.principal() {
        Some(principal) => GateOutcome::Authenticated(principal.clone()),
        None => GateOutcome::Anonymous,
    }
}

pub fn require_role(principal: &Principal, required: Role) -> Result<(), AuthError> {
    if principal.role.allows(required) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = principal.user_id,
            role = %principal.role,
            required = %required,
            "Access denied for role"
        );
        Err(AuthError::Forbidden { required })
    }
}

/// Destroy the session's state and move it to a new id.
pub fn logout(session: &mut Session, now: DateTime<Utc>) -> Result<(), AuthError> {
    let user_id = session.principal().map(|p| p.user_id);
    session.clear(now);
    session.rotate_id()?;
    tracing::info!(user_id, "Logged out");
    Ok(())
}
