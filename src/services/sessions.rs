//! Session handling: where visitor state lives and how keys are issued

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{error::AppResult, models::SessionData};

/// Backing store for session records, keyed by the cookie value
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, key: &str) -> AppResult<Option<SessionData>>;

    async fn save(&self, key: &str, data: &SessionData, ttl_seconds: u64) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct SessionsService {
    store: Arc<dyn SessionStore>,
    ttl_seconds: u64,
}

impl SessionsService {
    pub fn new(store: Arc<dyn SessionStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    /// Random, unguessable session key
    pub fn new_key() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub async fn load(&self, key: &str) -> AppResult<Option<SessionData>> {
        self.store.load(key).await
    }

    /// Persist `data` under `key`, issuing a fresh key when there is none.
    /// Returns the key the record now lives under.
    pub async fn save(&self, key: Option<&str>, data: &SessionData) -> AppResult<String> {
        let key = key.map(str::to_string).unwrap_or_else(Self::new_key);
        self.store.save(&key, data, self.ttl_seconds).await?;
        Ok(key)
    }

    /// Attach `user_id` to the visitor's session under a new key; the old
    /// record is dropped so a key seen before login is useless afterwards.
    pub async fn login(
        &self,
        previous_key: Option<&str>,
        mut data: SessionData,
        user_id: i32,
    ) -> AppResult<String> {
        data.user_id = Some(user_id);
        let key = self.save(None, &data).await?;
        if let Some(old) = previous_key {
            self.store.delete(old).await?;
        }
        Ok(key)
    }

    /// Forget everything stored for this visitor
    pub async fn flush(&self, key: &str) -> AppResult<()> {
        self.store.delete(key).await
    }
}
