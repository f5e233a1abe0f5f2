use chrono::{DateTime, Utc};

use crate::session::config::SESSION_STORE_TTL;
use crate::session::errors::SessionError;
use crate::session::types::Session;
use crate::storage::SESSION_BACKEND;

/// Load the session named by the client's cookie, or start a new one.
///
/// Ids the store does not know are never adopted: the caller gets a fresh
/// session under a server-generated id. A stored payload that no longer
/// deserializes is discarded the same way.
#[tracing::instrument(skip(session_id), fields(has_cookie = session_id.is_some()))]
pub async fn load_session(
    session_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Session, SessionError> {
    let Some(session_id) = session_id else {
        return Session::new(now);
    };

    let payload = SESSION_BACKEND.lock().await.fetch(session_id).await?;

    let Some(payload) = payload else {
        tracing::debug!("Unknown session id presented, issuing a new session");
        return Session::new(now);
    };

    match Session::from_payload(&payload) {
        Ok(session) if session.id == session_id => Ok(session),
        Ok(_) => {
            tracing::warn!("Stored session id does not match its key, issuing a new session");
            Session::new(now)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable session payload");
            Session::new(now)
        }
    }
}

/// Persist the session, applying any pending id rotation and removing the
/// entries of ids it has retired.
#[tracing::instrument(skip(session))]
pub async fn save_session(session: &mut Session) -> Result<(), SessionError> {
    if session.rotation_pending {
        session.rotate_id()?;
    }

    let payload = session.to_payload()?;

    let mut backend = SESSION_BACKEND.lock().await;
    for retired in session.retired_ids.drain(..) {
        backend.discard(&retired).await?;
    }
    backend
        .store(&session.id, payload, *SESSION_STORE_TTL)
        .await?;

    Ok(())
}
