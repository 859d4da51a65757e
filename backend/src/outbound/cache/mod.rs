//! User cache adapters.
//!
//! [`RedisUserCache`] stores JSON user snapshots under namespaced keys
//! (`user:v1:<uuid>`) with a fixed TTL. Writes are buffered and sent in one
//! pipeline on commit; read-through fills use `SET NX` so they never replace
//! a snapshot written by a command. [`UserCacheAdapter`] lets the composition root pick
//! Redis or the process-local cache at runtime without changing the factory
//! type.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, RunError};
use bb8_redis::redis::{self, AsyncCommands, RedisError};
use tracing::debug;

use crate::domain::ports::{GatewayError, UserCache};
use crate::domain::{User, UserId, UserSnapshot};
use crate::outbound::memory::InMemoryUserCache;

/// Default lifetime of a cached user.
pub const DEFAULT_USER_TTL: Duration = Duration::from_secs(60 * 60);

/// A staged cache write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CacheWrite {
    Replace(User),
    FillIfAbsent(User),
}

impl CacheWrite {
    pub(crate) fn user(&self) -> &User {
        match self {
            Self::Replace(user) | Self::FillIfAbsent(user) => user,
        }
    }
}

fn user_key(user_id: &UserId) -> String {
    format!("user:v1:{user_id}")
}

fn encode(user: &User) -> Result<String, GatewayError> {
    serde_json::to_string(&user.snapshot())
        .map_err(|err| GatewayError::corrupt(format!("user snapshot: {err}")))
}

fn decode(payload: &str) -> Result<User, GatewayError> {
    serde_json::from_str::<UserSnapshot>(payload)
        .map(User::restore)
        .map_err(|err| GatewayError::corrupt(format!("cached user: {err}")))
}

fn map_run_error(error: RunError<RedisError>) -> GatewayError {
    match error {
        RunError::User(err) => map_redis_error(err),
        RunError::TimedOut => GatewayError::connection("redis checkout timed out"),
    }
}

fn map_redis_error(error: RedisError) -> GatewayError {
    debug!(kind = ?error.kind(), "redis command failed");
    if error.is_connection_dropped() || error.is_connection_refusal() || error.is_timeout() {
        GatewayError::connection("redis unavailable")
    } else {
        GatewayError::query("redis command failed")
    }
}

/// Shared Redis connection pool.
pub type RedisPool = Pool<RedisConnectionManager>;

/// Build a Redis pool for `url`.
///
/// # Errors
/// [`GatewayError::Connection`] when the URL is malformed or the server
/// refuses the initial connection.
pub async fn connect_redis(url: &str) -> Result<RedisPool, GatewayError> {
    let manager = RedisConnectionManager::new(url).map_err(map_redis_error)?;
    Pool::builder()
        .build(manager)
        .await
        .map_err(map_redis_error)
}

/// Whole seconds for `SET EX`, which rejects zero.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// [`UserCache`] backed by Redis.
pub struct RedisUserCache {
    pool: RedisPool,
    ttl_secs: u64,
    pending: Mutex<Vec<CacheWrite>>,
}

impl RedisUserCache {
    /// Sub-second TTLs are raised to one second.
    pub fn new(pool: RedisPool, ttl: Duration) -> Self {
        Self {
            pool,
            ttl_secs: expiry_secs(ttl),
            pending: Mutex::new(Vec::new()),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Vec<CacheWrite>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn write_command(write: &CacheWrite, ttl_secs: u64) -> Result<redis::Cmd, GatewayError> {
    let user = write.user();
    let mut cmd = redis::cmd("SET");
    cmd.arg(user_key(user.id()))
        .arg(encode(user)?)
        .arg("EX")
        .arg(ttl_secs);
    if matches!(write, CacheWrite::FillIfAbsent(_)) {
        cmd.arg("NX");
    }
    Ok(cmd)
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, GatewayError> {
        let mut conn = self.pool.get().await.map_err(map_run_error)?;
        let payload: Option<String> = conn
            .get(user_key(user_id))
            .await
            .map_err(map_redis_error)?;
        payload.as_deref().map(decode).transpose()
    }

    async fn update_user(&self, user: &User) -> Result<(), GatewayError> {
        self.pending().push(CacheWrite::Replace(user.clone()));
        Ok(())
    }

    async fn fill_user(&self, user: &User) -> Result<(), GatewayError> {
        self.pending().push(CacheWrite::FillIfAbsent(user.clone()));
        Ok(())
    }

    async fn commit(&self) -> Result<(), GatewayError> {
        let writes = std::mem::take(&mut *self.pending());
        if writes.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for write in &writes {
            pipe.add_command(write_command(write, self.ttl_secs)?).ignore();
        }

        let mut conn = self.pool.get().await.map_err(map_run_error)?;
        let () = pipe
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }
}

/// Runtime choice of user cache.
pub enum UserCacheAdapter {
    Redis(RedisUserCache),
    Memory(InMemoryUserCache),
}

#[async_trait]
impl UserCache for UserCacheAdapter {
    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, GatewayError> {
        match self {
            Self::Redis(cache) => cache.get_user(user_id).await,
            Self::Memory(cache) => cache.get_user(user_id).await,
        }
    }

    async fn update_user(&self, user: &User) -> Result<(), GatewayError> {
        match self {
            Self::Redis(cache) => cache.update_user(user).await,
            Self::Memory(cache) => cache.update_user(user).await,
        }
    }

    async fn fill_user(&self, user: &User) -> Result<(), GatewayError> {
        match self {
            Self::Redis(cache) => cache.fill_user(user).await,
            Self::Memory(cache) => cache.fill_user(user).await,
        }
    }

    async fn commit(&self) -> Result<(), GatewayError> {
        match self {
            Self::Redis(cache) => cache.commit().await,
            Self::Memory(cache) => cache.commit().await,
        }
    }
}
