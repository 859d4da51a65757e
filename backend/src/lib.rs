//! Movie catalogue and rating service.
//!
//! Layers:
//! - [`domain`]: entities, use-case handlers and ports.
//! - [`inbound`]: HTTP API and the chat bot over WebSocket.
//! - [`outbound`]: PostgreSQL, Redis and in-memory adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
pub use settings::{AppSettings, SettingsError};
