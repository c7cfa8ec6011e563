//! Redis-backed storage for anti-forgery tokens

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use crate::error::{AppError, AppResult};

use super::nonces::TokenStore;

#[derive(Clone)]
pub struct RedisService {
    manager: ConnectionManager,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Reconnects on its own after the initial connection
        let mut manager = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut manager)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { manager })
    }

    fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }
}

#[async_trait]
impl TokenStore for RedisService {
    async fn put(&self, key: &str, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection();
        conn.set_ex::<_, _, ()>(key, "1", ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store token in Redis: {}", e)))
    }

    async fn take(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection();
        // Atomic read-and-delete: a token is consumed at most once
        let value: Option<String> = redis::cmd("GETDEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to consume token in Redis: {}", e)))?;
        Ok(value.is_some())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection();
        conn.exists(key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to check token in Redis: {}", e)))
    }
}
