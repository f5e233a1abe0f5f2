use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::userdb::{errors::UserError, types::User};

use super::config::DB_TABLE_USERS;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id BIGSERIAL PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            display_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'viewer',
            status TEXT NOT NULL DEFAULT 'active',
            last_login_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn get_active_user_by_username_postgres(
    pool: &Pool<Postgres>,
    username: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE username = $1 AND status = 'active'
        "#
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn get_user_by_username_postgres(
    pool: &Pool<Postgres>,
    username: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE username = $1
        "#
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn insert_user_postgres(
    pool: &Pool<Postgres>,
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
        VALUES ($1, $2, $3, $4, 'active', $5, $5)
        RETURNING *
        "#
    ))
    .bind(username)
    .bind(password_hash)
    .bind(display_name)
    .bind(role)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn record_login_postgres(
    pool: &Pool<Postgres>,
    user_id: i64,
    at: DateTime<Utc>,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET last_login_at = $1, updated_at = $1 WHERE id = $2
        "#
    ))
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

pub(super) async fn set_user_status_postgres(
    pool: &Pool<Postgres>,
    user_id: i64,
    status: &str,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET status = $1, updated_at = $2 WHERE id = $3
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
