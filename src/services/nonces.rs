//! Anti-forgery tokens bound to a user and an action.
//!
//! Single-use tokens guard admin mutations and are consumed on
//! verification. Shared tokens (the editor and search tokens) stay valid
//! until they expire.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use rand::RngCore;

use crate::error::{AppError, AppResult};

/// Action scope of the token embedded in admin pages for search requests
pub const AJAX_ACTION: &str = "book_ajax";

const TOKEN_BYTES: usize = 32;
const EXPIRED_MESSAGE: &str = "The link you followed has expired.";

/// Key/value storage with expiry for issued tokens
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Store `key` for `ttl_seconds`
    async fn put(&self, key: &str, ttl_seconds: u64) -> AppResult<()>;
    /// Remove `key`, reporting whether it was present
    async fn take(&self, key: &str) -> AppResult<bool>;
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Minimum time between sweeps of expired entries
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Default)]
struct Entries {
    expiries: HashMap<String, Instant>,
    last_prune: Option<Instant>,
}

/// In-process token store for single-process deployments.
///
/// Expired entries are swept at most once per prune interval; lookups
/// check expiry themselves.
pub struct MemoryTokenStore {
    entries: Mutex<Entries>,
    prune_interval: Duration,
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::with_prune_interval(PRUNE_INTERVAL)
    }
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prune_interval(prune_interval: Duration) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            prune_interval,
        }
    }

    /// Number of stored entries, expired ones included until the next sweep
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.expiries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Entries>> {
        self.entries
            .lock()
            .map_err(|_| AppError::Internal("Token store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, key: &str, ttl_seconds: u64) -> AppResult<()> {
        let now = Instant::now();
        let mut entries = self.lock()?;

        let due = entries
            .last_prune
            .map_or(true, |last| now.duration_since(last) >= self.prune_interval);
        if due {
            entries.expiries.retain(|_, expires| *expires > now);
            entries.last_prune = Some(now);
        }

        entries
            .expiries
            .insert(key.to_string(), now + Duration::from_secs(ttl_seconds));
        Ok(())
    }

    async fn take(&self, key: &str) -> AppResult<bool> {
        let now = Instant::now();
        Ok(matches!(self.lock()?.expiries.remove(key), Some(expires) if expires > now))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let now = Instant::now();
        Ok(matches!(self.lock()?.expiries.get(key), Some(expires) if *expires > now))
    }
}

#[derive(Clone)]
pub struct NonceService {
    store: Arc<dyn TokenStore>,
    ttl_seconds: u64,
}

impl NonceService {
    pub fn new(store: Arc<dyn TokenStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    /// Issue a fresh token for `user_id` scoped to `action`
    pub async fn create(&self, user_id: i64, action: &str) -> AppResult<String> {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        self.store
            .put(&Self::key(user_id, action, &token), self.ttl_seconds)
            .await?;
        Ok(token)
    }

    /// Verify and burn a single-use token
    pub async fn consume(&self, user_id: i64, action: &str, token: &str) -> AppResult<()> {
        if Self::well_formed(token) && self.store.take(&Self::key(user_id, action, token)).await? {
            return Ok(());
        }
        tracing::warn!(user_id, action, "Rejected anti-forgery token");
        Err(AppError::InvalidNonce(EXPIRED_MESSAGE.to_string()))
    }

    /// Verify a shared token without consuming it
    pub async fn verify(&self, user_id: i64, action: &str, token: &str) -> AppResult<()> {
        if Self::well_formed(token) && self.store.exists(&Self::key(user_id, action, token)).await? {
            return Ok(());
        }
        tracing::warn!(user_id, action, "Rejected anti-forgery token");
        Err(AppError::InvalidNonce(EXPIRED_MESSAGE.to_string()))
    }

    fn key(user_id: i64, action: &str, token: &str) -> String {
        format!("nonce:{}:{}:{}", user_id, action, token)
    }

    fn well_formed(token: &str) -> bool {
        token.len() == TOKEN_BYTES * 2 && token.bytes().all(|b| b.is_ascii_hexdigit())
    }
}
