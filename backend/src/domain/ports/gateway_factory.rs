//! Per-request construction of gateway instances.

use super::{DatabaseGateway, EventBus, TaskQueue, UserCache};

/// Builds fresh gateways for each unit of work.
///
/// Instances are never shared between requests, so staged writes from one
/// request cannot leak into another's commit.
pub trait GatewayFactory: Send + Sync {
    type Database: DatabaseGateway;
    type Cache: UserCache;
    type Queue: TaskQueue;
    type Events: EventBus;

    fn database(&self) -> Self::Database;

    fn cache(&self) -> Self::Cache;

    fn task_queue(&self) -> Self::Queue;

    fn event_bus(&self) -> Self::Events;
}
