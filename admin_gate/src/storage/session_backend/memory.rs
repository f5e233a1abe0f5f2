use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::storage::errors::StorageError;

use super::{SessionBackend, session_key};

/// Expired records are swept once per this many writes.
const PURGE_INTERVAL_WRITES: u32 = 256;

struct MemoryRecord {
    payload: String,
    expires_at: DateTime<Utc>,
}

/// Single-process backend. Sessions are lost on restart.
pub(super) struct MemorySessionBackend {
    records: HashMap<String, MemoryRecord>,
    writes_since_purge: u32,
}

impl MemorySessionBackend {
    pub(super) fn new() -> Self {
        Self {
            records: HashMap::new(),
            writes_since_purge: 0,
        }
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.records.retain(|_, r| r.expires_at > now);
    }
}

#[async_trait]
impl SessionBackend for MemorySessionBackend {
    async fn check(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn fetch(&self, session_id: &str) -> Result<Option<String>, StorageError> {
        let now = Utc::now();
        Ok(self
            .records
            .get(&session_key(session_id))
            .filter(|r| r.expires_at > now)
            .map(|r| r.payload.clone()))
    }

    async fn store(
        &mut self,
        session_id: &str,
        payload: String,
        ttl_seconds: u64,
    ) -> Result<(), StorageError> {
        let now = Utc::now();
        self.writes_since_purge += 1;
        if self.writes_since_purge >= PURGE_INTERVAL_WRITES {
            self.purge_expired(now);
            self.writes_since_purge = 0;
        }

        let expires_at = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.records
            .insert(session_key(session_id), MemoryRecord { payload, expires_at });
        Ok(())
    }

    async fn discard(&mut self, session_id: &str) -> Result<(), StorageError> {
        self.records.remove(&session_key(session_id));
        Ok(())
    }
}
