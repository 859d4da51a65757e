//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL gateway and transactional outbox (Diesel)
//! - **cache**: Redis user cache (`bb8-redis`)
//! - **memory**: process-local adapters for running without a database
//! - **password**: Argon2id password encoder
//!
//! Adapters translate between domain types and storage representations and
//! hold no business rules.

pub mod cache;
pub mod memory;
pub mod password;
pub mod persistence;
