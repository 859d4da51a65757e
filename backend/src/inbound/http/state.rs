//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and reach every use case through the
//! [`Interactor`] port, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::Interactor;

#[derive(Clone)]
pub struct HttpState {
    pub interactor: Arc<dyn Interactor>,
}

impl HttpState {
    pub fn new(interactor: Arc<dyn Interactor>) -> Self {
        Self { interactor }
    }
}
