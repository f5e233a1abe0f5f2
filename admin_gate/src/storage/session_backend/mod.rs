mod config;
mod memory;
mod redis;

use async_trait::async_trait;

use crate::storage::errors::StorageError;

pub(crate) use config::SESSION_BACKEND;

/// Where serialized sessions live between requests.
#[async_trait]
pub(crate) trait SessionBackend: Send + Sync + 'static {
    /// Verify the backend is reachable.
    async fn check(&self) -> Result<(), StorageError>;

    async fn fetch(&self, session_id: &str) -> Result<Option<String>, StorageError>;

    /// Write a payload that disappears after `ttl_seconds`.
    async fn store(
        &mut self,
        session_id: &str,
        payload: String,
        ttl_seconds: u64,
    ) -> Result<(), StorageError>;

    async fn discard(&mut self, session_id: &str) -> Result<(), StorageError>;
}

fn session_key(session_id: &str) -> String {
    format!("admin_gate:session:{session_id}")
}
