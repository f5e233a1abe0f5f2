use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::session::{Principal, Role};
use crate::userdb::errors::UserError;

/// Console account as stored in the users table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    /// `admin`, `editor` or `viewer`
    pub role: String,
    /// `active` or `disabled`
    pub status: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active.as_str()
    }

    pub fn role(&self) -> Result<Role, UserError> {
        self.role
            .parse()
            .map_err(|_| UserError::InvalidData(format!("Unknown role '{}'", self.role)))
    }

    /// The session-side view of this account.
    pub fn to_principal(&self) -> Result<Principal, UserError> {
        Ok(Principal {
            user_id: self.id,
            role: self.role()?,
            display_name: self.display_name.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Disabled,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Disabled => "disabled",
        }
    }
}

/// Fields needed to create an account. The password is hashed before insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}
