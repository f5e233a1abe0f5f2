use chrono::{DateTime, Utc};

use crate::storage::{DATABASE, Database};
use crate::userdb::{
    errors::UserError,
    password::hash_password_blocking,
    types::{NewUser, User, UserStatus},
};

use super::postgres::*;
use super::sqlite::*;

pub struct UserStore;

impl UserStore {
    /// Create the users table if it does not exist
    pub async fn init() -> Result<(), UserError> {
        match &*DATABASE {
            Database::Sqlite(pool) => create_tables_sqlite(pool).await,
            Database::Postgres(pool) => create_tables_postgres(pool).await,
        }
    }

    /// Look up an account that may sign in. Disabled accounts are not returned.
    #[tracing::instrument(skip(username))]
    pub async fn find_active_user(username: &str) -> Result<Option<User>, UserError> {
        let result = match &*DATABASE {
            Database::Sqlite(pool) => get_active_user_by_username_sqlite(pool, username).await,
            Database::Postgres(pool) => get_active_user_by_username_postgres(pool, username).await,
        };

        match &result {
            Ok(found) => tracing::debug!(found = found.is_some(), "User lookup completed"),
            Err(e) => tracing::error!(error = %e, "User lookup failed"),
        }

        result
    }

    pub async fn get_user_by_username(username: &str) -> Result<Option<User>, UserError> {
        match &*DATABASE {
            Database::Sqlite(pool) => get_user_by_username_sqlite(pool, username).await,
            Database::Postgres(pool) => get_user_by_username_postgres(pool, username).await,
        }
    }

    /// Create an active account, hashing its password.
    #[tracing::instrument(skip(new_user), fields(username = %new_user.username, role = %new_user.role))]
    pub async fn create_user(new_user: &NewUser) -> Result<User, UserError> {
        let username = new_user.username.trim();
        if username.is_empty() {
            return Err(UserError::InvalidData("Username cannot be empty".to_string()));
        }
        if new_user.password.is_empty() {
            return Err(UserError::InvalidData("Password cannot be empty".to_string()));
        }
        let password_hash = hash_password_blocking(&new_user.password).await?;
        let role = new_user.role.as_str();
        let display_name = new_user.display_name.as_str();

        let user = match &*DATABASE {
            Database::Sqlite(pool) => {
                insert_user_sqlite(pool, username, &password_hash, display_name, role).await
            }
            Database::Postgres(pool) => {
                insert_user_postgres(pool, username, &password_hash, display_name, role).await
            }
        }?;

        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    #[tracing::instrument]
    pub async fn record_login(user_id: i64, at: DateTime<Utc>) -> Result<(), UserError> {
        match &*DATABASE {
            Database::Sqlite(pool) => record_login_sqlite(pool, user_id, at).await,
            Database::Postgres(pool) => record_login_postgres(pool, user_id, at).await,
        }
    }

    #[tracing::instrument]
    pub async fn set_user_status(user_id: i64, status: UserStatus) -> Result<(), UserError> {
        match &*DATABASE {
            Database::Sqlite(pool) => set_user_status_sqlite(pool, user_id, status.as_str()).await,
            Database::Postgres(pool) => {
                set_user_status_postgres(pool, user_id, status.as_str()).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use crate::test_utils::init_test_environment;
    use crate::userdb::verify_password;
    use serial_test::serial;

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "s3cret-pass".to_string(),
            display_name: format!("{username} display"),
            role,
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_create_and_find_active_user() {
        init_test_environment().await;

        // Given a newly created editor
        let created = UserStore::create_user(&new_user("store_editor", Role::Editor))
            .await
            .unwrap();

        // When it is looked up
        let found = UserStore::find_active_user("store_editor")
            .await
            .unwrap()
            .unwrap();

        // Then the stored hash verifies the original password
        assert_eq!(found.id, created.id);
        assert_eq!(found.role().unwrap(), Role::Editor);
        assert!(verify_password("s3cret-pass", &found.password_hash));
    }

    #[tokio::test]
    #[serial]
    async fn test_disabled_user_cannot_be_found_for_login() {
        init_test_environment().await;
        let created = UserStore::create_user(&new_user("store_disabled", Role::Viewer))
            .await
            .unwrap();

        UserStore::set_user_status(created.id, UserStatus::Disabled)
            .await
            .unwrap();

        assert!(
            UserStore::find_active_user("store_disabled")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_create_user_rejects_blank_username() {
        init_test_environment().await;
        let result = UserStore::create_user(&new_user("   ", Role::Viewer)).await;
        assert!(matches!(result, Err(UserError::InvalidData(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_record_login_updates_user() {
        init_test_environment().await;
        let created = UserStore::create_user(&new_user("store_login", Role::Admin))
            .await
            .unwrap();
        let at = DateTime::parse_from_rfc3339("2026-04-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);

        UserStore::record_login(created.id, at).await.unwrap();

        let found = UserStore::get_user_by_username("store_login")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.last_login_at, Some(at));
    }
}
