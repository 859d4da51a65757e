//! Builders for the interactor and the adapter states that share it.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use cinerate::domain::HandlerInteractor;
use cinerate::domain::ports::{Interactor, PasswordEncoder};
use cinerate::inbound::http::state::HttpState;
use cinerate::inbound::ws::state::WsState;
use cinerate::outbound::memory::{InMemoryGatewayFactory, InMemoryStore};
use cinerate::outbound::persistence::{CacheBackend, DieselGatewayFactory};

use super::ServerConfig;

/// Wire the use cases to PostgreSQL when a pool is configured, otherwise to
/// the in-memory store.
pub(crate) fn build_interactor(config: &ServerConfig) -> Arc<dyn Interactor> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let encoder: Arc<dyn PasswordEncoder> = Arc::new(config.password_encoder.clone());

    let Some(pool) = &config.db_pool else {
        warn!("no database configured; data lives in memory and is lost on restart");
        let store = InMemoryStore::new().with_user_cache_ttl(config.user_cache_ttl);
        let factory = InMemoryGatewayFactory::new(store);
        return Arc::new(HandlerInteractor::new(factory, encoder, clock));
    };

    let cache = match &config.redis_pool {
        Some(redis) => {
            info!(ttl_secs = config.user_cache_ttl.as_secs(), "caching users in Redis");
            CacheBackend::Redis {
                pool: redis.clone(),
                ttl: config.user_cache_ttl,
            }
        }
        None => {
            warn!("no Redis configured; caching users in process memory");
            CacheBackend::Memory(InMemoryStore::new().with_user_cache_ttl(config.user_cache_ttl))
        }
    };
    let factory = DieselGatewayFactory::new(pool.clone(), cache, Arc::clone(&clock));
    Arc::new(HandlerInteractor::new(factory, encoder, clock))
}

pub(crate) fn build_http_state(interactor: &Arc<dyn Interactor>) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(Arc::clone(interactor)))
}

pub(crate) fn build_ws_state(interactor: &Arc<dyn Interactor>) -> web::Data<WsState> {
    web::Data::new(WsState::new(Arc::clone(interactor)))
}
