//! Narrow contracts for auxiliary services: password encoding, the user
//! cache mirror, the background task queue and the event bus.
//!
//! Cache, queue and event bus stage their effects and apply them on
//! `commit`, mirroring the gateway unit of work.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::{AddingTaskCreatedEvent, PasswordHash, User, UserId};

/// One-way password encoding.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordEncoder: Send + Sync {
    /// Encode a plain-text password for storage.
    fn encode(&self, password: &str) -> Result<PasswordHash, GatewayError>;

    /// Check a plain-text password against a stored hash.
    ///
    /// Malformed hashes never verify.
    fn verify(&self, password: &str, hash: &PasswordHash) -> bool;
}

/// Read-through mirror of user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCache: Send + Sync {
    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, GatewayError>;

    /// Stage a fresh snapshot of `user`, replacing any cached entry.
    async fn update_user(&self, user: &User) -> Result<(), GatewayError>;

    /// Stage a read-through fill. On commit it is written only when no entry
    /// for the user exists, so it never replaces an `update_user` snapshot.
    async fn fill_user(&self, user: &User) -> Result<(), GatewayError>;

    async fn commit(&self) -> Result<(), GatewayError>;
}

/// Background job submission.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Stage a greeting email for a newly confirmed user.
    async fn enqueue_send_greeting_email(&self, user_id: &UserId) -> Result<(), GatewayError>;

    async fn commit(&self) -> Result<(), GatewayError>;
}

/// Domain event publication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish_adding_task_created(
        &self,
        event: &AddingTaskCreatedEvent,
    ) -> Result<(), GatewayError>;

    async fn commit(&self) -> Result<(), GatewayError>;
}
