use async_trait::async_trait;
use redis::AsyncCommands;

use crate::storage::errors::StorageError;

use super::{SessionBackend, session_key};

/// Shared backend for multi-process deployments. Expiry is delegated to Redis.
pub(super) struct RedisSessionBackend {
    client: redis::Client,
}

impl RedisSessionBackend {
    pub(super) fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StorageError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl SessionBackend for RedisSessionBackend {
    async fn check(&self) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn fetch(&self, session_id: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection().await?;
        Ok(conn.get(session_key(session_id)).await?)
    }

    async fn store(
        &mut self,
        session_id: &str,
        payload: String,
        ttl_seconds: u64,
    ) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        // SETEX rejects a zero expiry
        let _: () = conn
            .set_ex(session_key(session_id), payload, ttl_seconds.max(1))
            .await?;
        Ok(())
    }

    async fn discard(&mut self, session_id: &str) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(session_key(session_id)).await?;
        Ok(())
    }
}
