//! Redis-backed session store

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::{
    error::{AppError, AppResult},
    models::SessionData,
};

use super::sessions::SessionStore;

#[derive(Clone)]
pub struct RedisSessionStore {
    client: Client,
}

impl RedisSessionStore {
    /// Open the client and check the server answers
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Session(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Session(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Session(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Session(format!("Failed to get Redis connection: {}", e)))
    }

    fn redis_key(key: &str) -> String {
        format!("session:{}", key)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, key: &str) -> AppResult<Option<SessionData>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(Self::redis_key(key)).await?;

        // A record we cannot decode is treated as an empty session
        Ok(raw.and_then(|payload| match serde_json::from_str(&payload) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!("Discarding undecodable session record: {}", e);
                None
            }
        }))
    }

    async fn save(&self, key: &str, data: &SessionData, ttl_seconds: u64) -> AppResult<()> {
        let payload = serde_json::to_string(data)
            .map_err(|e| AppError::Internal(format!("Failed to encode session: {}", e)))?;

        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(Self::redis_key(key), payload, ttl_seconds)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(Self::redis_key(key)).await?;
        Ok(())
    }
}
