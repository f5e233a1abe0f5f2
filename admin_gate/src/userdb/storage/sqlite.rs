use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::userdb::{errors::UserError, types::User};

use super::config::DB_TABLE_USERS;

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            display_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'viewer',
            status TEXT NOT NULL DEFAULT 'active',
            last_login_at TIMESTAMP,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn get_active_user_by_username_sqlite(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE username = ? AND status = 'active'
        "#
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn get_user_by_username_sqlite(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE username = ?
        "#
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn insert_user_sqlite(
    pool: &Pool<Sqlite>,
    username: &str,
    password_hash: &str,
    display_name: &str,
    role: &str,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();
    let now = Utc::now();

    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name}
            (username, password_hash, display_name, role, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, 'active', ?, ?)
        RETURNING *
        "#
    ))
    .bind(username)
    .bind(password_hash)
    .bind(display_name)
    .bind(role)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn record_login_sqlite(
    pool: &Pool<Sqlite>,
    user_id: i64,
    at: DateTime<Utc>,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET last_login_at = ?, updated_at = ? WHERE id = ?
        "#
    ))
    .bind(at)
    .bind(at)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(UserError::NotFound);
    }
    Ok(())
}

pub(super) async fn set_user_status_sqlite(
    pool: &Pool<Sqlite>,
    user_id: i64,
    status: &str,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET status = ?, updated_at = ? WHERE id = ?
        "#
    ))
    .bind(status)
    .bind(Utc::now())
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(UserError::NotFound);
    }
    Ok(())
}
