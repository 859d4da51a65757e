//! Shared WebSocket adapter state.

use std::sync::Arc;

use crate::domain::ports::Interactor;

/// Dependencies handed to every bot connection.
#[derive(Clone)]
pub struct WsState {
    pub interactor: Arc<dyn Interactor>,
}

impl WsState {
    pub fn new(interactor: Arc<dyn Interactor>) -> Self {
        Self { interactor }
    }
}
