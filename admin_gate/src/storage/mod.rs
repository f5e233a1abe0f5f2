//! Backends: a key/value store for session payloads and a relational
//! database for accounts.

mod database;
mod errors;
mod session_backend;

pub use errors::StorageError;

pub(crate) use database::{DATABASE, DB_TABLE_PREFIX, Database};
pub(crate) use session_backend::SESSION_BACKEND;

/// Connect the session backend. The database pool connects lazily on first query.
pub async fn init() -> Result<(), StorageError> {
    let _ = &*DATABASE;
    SESSION_BACKEND.lock().await.check().await
}
