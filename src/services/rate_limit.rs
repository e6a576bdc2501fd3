use async_trait::async_trait;
use moka::Expiry;
use redis::aio::ConnectionManager;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur with rate-limit store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),
}

/// Counter store whose keys expire after a fixed window
///
/// Injected into the rate limiter so a single-instance deployment can keep
/// counts in memory while a multi-instance one shares them through Redis.
#[async_trait]
pub trait KeyExpiryStore: Send + Sync {
    /// Increment `key` and return the count within the current window
    ///
    /// The window starts with the first increment and is not extended by
    /// later ones.
    async fn increment(&self, key: &str, window: Duration) -> Result<u64, StoreError>;
}

#[derive(Debug)]
struct WindowCounter {
    count: AtomicU64,
    window: Duration,
}

struct WindowExpiry;

impl Expiry<String, Arc<WindowCounter>> for WindowExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Arc<WindowCounter>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.window)
    }
}

/// In-memory store backed by a moka cache
pub struct MemoryStore {
    counters: moka::future::Cache<String, Arc<WindowCounter>>,
}

impl MemoryStore {
    pub fn new(max_keys: u64) -> Self {
        let counters = moka::future::Cache::builder()
            .max_capacity(max_keys)
            .expire_after(WindowExpiry)
            .build();

        Self { counters }
    }
}

#[async_trait]
impl KeyExpiryStore for MemoryStore {
    async fn increment(&self, key: &str, window: Duration) -> Result<u64, StoreError> {
        let counter = self
            .counters
            .get_with(key.to_string(), async move {
                Arc::new(WindowCounter {
                    count: AtomicU64::new(0),
                    window,
                })
            })
            .await;

        Ok(counter.count.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Redis commands the windowed counter needs
#[async_trait]
pub trait CounterConnection: Send + Sync {
    /// INCR `key` and read its TTL in one MULTI/EXEC round trip
    async fn incr_with_ttl(&self, key: &str) -> Result<(u64, i64), StoreError>;

    async fn expire(&self, key: &str, secs: u64) -> Result<(), StoreError>;
}

#[async_trait]
impl CounterConnection for ConnectionManager {
    async fn incr_with_ttl(&self, key: &str) -> Result<(u64, i64), StoreError> {
        let mut conn = self.clone();

        let (count, ttl): (u64, i64) = redis::pipe()
            .atomic()
            .cmd("INCR")
            .arg(key)
            .cmd("TTL")
            .arg(key)
            .query_async(&mut conn)
            .await?;

        Ok((count, ttl))
    }

    async fn expire(&self, key: &str, secs: u64) -> Result<(), StoreError> {
        let mut conn = self.clone();

        let _: i64 = redis::cmd("EXPIRE")
            .arg(key)
            .arg(secs)
            .query_async(&mut conn)
            .await?;

        Ok(())
    }
}

/// Redis-backed store shared across instances
pub struct RedisStore<C = ConnectionManager> {
    conn: C,
}

impl RedisStore<ConnectionManager> {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

impl<C: CounterConnection> RedisStore<C> {
    pub fn with_connection(conn: C) -> Self {
        Self { conn }
    }
}

/// A TTL of -1 means the key exists without an expiry
///
/// That is the case for a fresh counter, and for one whose EXPIRE was lost
/// after the INCR landed. Arming on every such read keeps a lost EXPIRE from
/// pinning the counter forever.
#[inline]
fn window_needs_arming(ttl: i64) -> bool {
    ttl == -1
}

#[async_trait]
impl<C: CounterConnection> KeyExpiryStore for RedisStore<C> {
    async fn increment(&self, key: &str, window: Duration) -> Result<u64, StoreError> {
        let (count, ttl) = self.conn.incr_with_ttl(key).await?;

        if window_needs_arming(ttl) {
            self.conn.expire(key, window.as_secs().max(1)).await?;
        }

        Ok(count)
    }
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u64,
}

/// Fixed-window rate limiter over an injected store
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KeyExpiryStore>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyExpiryStore>, max_requests: u64, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    /// Count a request for `client` under `scope`
    pub async fn check(&self, scope: &str, client: &str) -> Result<RateDecision, StoreError> {
        let key = RateLimitKey::build(scope, client);
        let count = self.store.increment(&key, self.window).await?;

        let decision = RateDecision {
            allowed: count <= self.max_requests,
            remaining: self.max_requests.saturating_sub(count),
        };

        if !decision.allowed {
            tracing::debug!("Rate limit exceeded for {}", key);
        }

        Ok(decision)
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Rate-limit key builder
pub struct RateLimitKey;

impl RateLimitKey {
    pub fn build(scope: &str, client: &str) -> String {
        format!("ratelimit:{}:{}", scope, client)
    }
}
