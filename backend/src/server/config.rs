//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use cinerate::outbound::cache::RedisPool;
use cinerate::outbound::password::Argon2PasswordEncoder;
use cinerate::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_USER_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) redis_pool: Option<RedisPool>,
    pub(crate) user_cache_ttl: Duration,
    pub(crate) password_encoder: Argon2PasswordEncoder,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration from session preferences.
    ///
    /// Without a database pool the server stores everything in memory.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            redis_pool: None,
            user_cache_ttl: DEFAULT_USER_CACHE_TTL,
            password_encoder: Argon2PasswordEncoder::new(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Store users, movies and the outbox in PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Cache user snapshots in Redis. Ignored without a database pool.
    #[must_use]
    pub fn with_redis_pool(mut self, pool: RedisPool) -> Self {
        self.redis_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_user_cache_ttl(mut self, ttl: Duration) -> Self {
        self.user_cache_ttl = ttl;
        self
    }

    /// Replace the default Argon2id cost, e.g. with a cheap one in tests.
    #[must_use]
    pub fn with_password_encoder(mut self, encoder: Argon2PasswordEncoder) -> Self {
        self.password_encoder = encoder;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
