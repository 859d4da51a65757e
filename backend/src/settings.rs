//! Application settings loaded via OrthoConfig.
//!
//! Values merge from CLI flags, `CINERATE_*` environment variables and an
//! optional config file. Tuning knobs carry OrthoConfig defaults; storage
//! URLs stay optional and select in-memory adapters when unset.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8080);

/// Rejected setting values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("user_cache_ttl_secs must be at least 1")]
    ZeroUserCacheTtl,
    #[error("db_pool_max_size must be at least 1")]
    ZeroPoolSize,
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CINERATE")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without it the service runs on in-memory storage.
    pub database_url: Option<String>,
    /// Redis URL for the user cache. Without it users are cached in memory.
    pub redis_url: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_pool_max_size: u32,
    /// Lifetime of cached user snapshots.
    #[ortho_config(default = 3600)]
    pub user_cache_ttl_secs: u64,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn user_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.user_cache_ttl_secs)
    }

    /// Reject values the storage adapters cannot honour.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.user_cache_ttl_secs == 0 {
            return Err(SettingsError::ZeroUserCacheTtl);
        }
        if self.db_pool_max_size == 0 {
            return Err(SettingsError::ZeroPoolSize);
        }
        Ok(())
    }
}
