//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::web;
use mockable::Clock;

use crate::domain::HandlerInteractor;
use crate::domain::test_support::{fixture_clock, password_encoder};
use crate::outbound::memory::{InMemoryGatewayFactory, InMemoryStore};

use super::state::HttpState;

/// Session middleware with a fresh key and the `Secure` flag off for plain
/// HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// HTTP state over the in-memory adapters, plus the store for assertions.
pub fn memory_state() -> (web::Data<HttpState>, InMemoryStore) {
    let store = InMemoryStore::new();
    let clock: Arc<dyn Clock> = fixture_clock();
    let interactor = HandlerInteractor::new(
        InMemoryGatewayFactory::new(store.clone()),
        password_encoder(),
        clock,
    );
    (web::Data::new(HttpState::new(Arc::new(interactor))), store)
}
