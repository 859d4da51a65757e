//! Gateway factory for PostgreSQL-backed deployments.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;

use crate::domain::ports::GatewayFactory;
use crate::outbound::cache::{RedisPool, RedisUserCache, UserCacheAdapter};
use crate::outbound::memory::{InMemoryStore, InMemoryUserCache};

use super::diesel_gateway::DieselGateway;
use super::outbox::{OutboxEventBus, OutboxTaskQueue};
use super::pool::DbPool;

/// Where cached users live.
#[derive(Clone)]
pub enum CacheBackend {
    Redis { pool: RedisPool, ttl: Duration },
    Memory(InMemoryStore),
}

/// Builds Diesel gateways and outbox adapters over one shared pool.
#[derive(Clone)]
pub struct DieselGatewayFactory {
    pool: DbPool,
    cache: CacheBackend,
    clock: Arc<dyn Clock>,
}

impl DieselGatewayFactory {
    pub fn new(pool: DbPool, cache: CacheBackend, clock: Arc<dyn Clock>) -> Self {
        Self { pool, cache, clock }
    }
}

impl GatewayFactory for DieselGatewayFactory {
    type Database = DieselGateway;
    type Cache = UserCacheAdapter;
    type Queue = OutboxTaskQueue;
    type Events = OutboxEventBus;

    fn database(&self) -> Self::Database {
        DieselGateway::new(self.pool.clone())
    }

    fn cache(&self) -> Self::Cache {
        match &self.cache {
            CacheBackend::Redis { pool, ttl } => {
                UserCacheAdapter::Redis(RedisUserCache::new(pool.clone(), *ttl))
            }
            CacheBackend::Memory(store) => {
                UserCacheAdapter::Memory(InMemoryUserCache::new(store.clone()))
            }
        }
    }

    fn task_queue(&self) -> Self::Queue {
        OutboxTaskQueue::new(self.pool.clone(), Arc::clone(&self.clock))
    }

    fn event_bus(&self) -> Self::Events {
        OutboxEventBus::new(self.pool.clone(), Arc::clone(&self.clock))
    }
}
