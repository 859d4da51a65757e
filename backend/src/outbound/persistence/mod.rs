//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Reads run on pooled `diesel-async` connections. Writes are staged per
//! gateway instance and replayed in one transaction on commit. Row structs
//! (`models`) and table definitions (`schema`) stay private to this module.
//!
//! # Example
//!
//! ```ignore
//! use cinerate::outbound::persistence::{DbPool, DieselGateway, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/cinerate")).await?;
//! let gateway = DieselGateway::new(pool);
//! ```

mod diesel_gateway;
mod error_mapping;
mod factory;
mod migrations;
mod models;
mod outbox;
mod pool;
mod schema;

pub use diesel_gateway::DieselGateway;
pub use factory::{CacheBackend, DieselGatewayFactory};
pub use migrations::{MigrationError, run_migrations};
pub use outbox::{
    ADDING_TASK_CREATED_TOPIC, OutboxEventBus, OutboxTaskQueue, SEND_GREETING_EMAIL_TOPIC,
};
pub use pool::{DbPool, PoolConfig, PoolError};
