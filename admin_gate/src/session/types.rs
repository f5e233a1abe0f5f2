use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::session::config::SESSION_ID_BYTES;
use crate::session::errors::SessionError;
use crate::utils::gen_random_string;

/// Console role. Declaration order is privilege order: `Viewer < Editor < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }

    /// True when this role grants at least the privileges of `required`.
    pub fn allows(self, required: Role) -> bool {
        self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viewer" => Ok(Role::Viewer),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            other => Err(SessionError::InvalidData(format!("Unknown role: {other}"))),
        }
    }
}

/// The authenticated user as cached in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
    pub display_name: String,
}

/// Anti-forgery token handed to templates and compared against submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Token and issue time are stored together so neither can exist without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CsrfState {
    pub(crate) token: String,
    pub(crate) issued_at: DateTime<Utc>,
}

/// Composite rate-limit key for an (action, client address) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateLimitKey(String);

impl RateLimitKey {
    pub fn new(action: &str, client: &str) -> Self {
        // Callers pass constant action names and parsed IP addresses, neither contains '|'
        Self(format!("{action}|{client}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Fixed-window counter state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEntry {
    pub attempts: u32,
    pub window_ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Denied { retry_after_seconds: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }
}

/// Server-side state of one client session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub(crate) id: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_activity: Option<DateTime<Utc>>,
    pub(crate) principal: Option<Principal>,
    pub(crate) csrf: Option<CsrfState>,
    #[serde(default)]
    pub(crate) rate_limits: HashMap<RateLimitKey, RateLimitEntry>,
    /// Ids this session was known under before rotation; removed from the store on save.
    #[serde(skip)]
    pub(crate) retired_ids: Vec<String>,
    /// Set when state was cleared by a sync operation; the id is rotated on save.
    #[serde(skip)]
    pub(crate) rotation_pending: bool,
}

impl Session {
    /// Create an empty session with a fresh random id.
    pub fn new(now: DateTime<Utc>) -> Result<Self, SessionError> {
        Ok(Self::with_id(gen_random_string(SESSION_ID_BYTES)?, now))
    }

    pub(crate) fn with_id(id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            last_activity: None,
            principal: None,
            csrf: None,
            rate_limits: HashMap::new(),
            retired_ids: Vec::new(),
            rotation_pending: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    pub fn rate_limit_entry(&self, action: &str, client: &str) -> Option<&RateLimitEntry> {
        self.rate_limits.get(&RateLimitKey::new(action, client))
    }

    /// Move to a new id now, retiring the current one.
    pub(crate) fn rotate_id(&mut self) -> Result<(), SessionError> {
        let new_id = gen_random_string(SESSION_ID_BYTES)?;
        let old_id = std::mem::replace(&mut self.id, new_id);
        self.retired_ids.push(old_id);
        self.rotation_pending = false;
        Ok(())
    }

    /// Drop every piece of session state. The id is rotated when the session is saved.
    pub(crate) fn clear(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.last_activity = None;
        self.principal = None;
        self.csrf = None;
        self.rate_limits.clear();
        self.rotation_pending = true;
    }
}

impl Session {
    /// Serialized form kept in the session backend.
    pub(crate) fn to_payload(&self) -> Result<String, SessionError> {
        serde_json::to_string(self).map_err(|e| SessionError::InvalidData(e.to_string()))
    }

    pub(crate) fn from_payload(payload: &str) -> Result<Self, SessionError> {
        serde_json::from_str(payload).map_err(|e| SessionError::InvalidData(e.to_string()))
    }
}
