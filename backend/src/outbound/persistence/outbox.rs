//! `outbox_messages` table backing the task queue and event bus ports.
//!
//! Messages are buffered per instance and inserted in a single statement on
//! commit, on their own connection. The insert is not part of the gateway's
//! transaction, so a message can commit while the row it describes does not.
//! Nothing in this service consumes the table; rows carry a topic and a JSON
//! payload for an external consumer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use serde_json::json;

use crate::domain::ports::{EventBus, GatewayError, TaskQueue};
use crate::domain::{AddingTaskCreatedEvent, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewOutboxRecord;
use super::pool::DbPool;
use super::schema::outbox_messages;

pub const SEND_GREETING_EMAIL_TOPIC: &str = "send_greeting_email";
pub const ADDING_TASK_CREATED_TOPIC: &str = "adding_task_created";

struct Outbox {
    pool: DbPool,
    clock: Arc<dyn Clock>,
    pending: Mutex<Vec<NewOutboxRecord>>,
}

impl Outbox {
    fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            clock,
            pending: Mutex::new(Vec::new()),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Vec<NewOutboxRecord>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stage(&self, topic: &str, payload: serde_json::Value) {
        let record = NewOutboxRecord::new(topic, payload, self.clock.utc());
        self.pending().push(record);
    }

    async fn flush(&self) -> Result<(), GatewayError> {
        let records = std::mem::take(&mut *self.pending());
        if records.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(outbox_messages::table)
            .values(&records)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

/// [`TaskQueue`] writing jobs to the outbox.
pub struct OutboxTaskQueue {
    outbox: Outbox,
}

impl OutboxTaskQueue {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self {
            outbox: Outbox::new(pool, clock),
        }
    }
}

#[async_trait]
impl TaskQueue for OutboxTaskQueue {
    async fn enqueue_send_greeting_email(&self, user_id: &UserId) -> Result<(), GatewayError> {
        self.outbox
            .stage(SEND_GREETING_EMAIL_TOPIC, json!({ "userId": user_id }));
        Ok(())
    }

    async fn commit(&self) -> Result<(), GatewayError> {
        self.outbox.flush().await
    }
}

/// [`EventBus`] writing events to the outbox.
pub struct OutboxEventBus {
    outbox: Outbox,
}

impl OutboxEventBus {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self {
            outbox: Outbox::new(pool, clock),
        }
    }
}

#[async_trait]
impl EventBus for OutboxEventBus {
    async fn publish_adding_task_created(
        &self,
        event: &AddingTaskCreatedEvent,
    ) -> Result<(), GatewayError> {
        let payload = serde_json::to_value(event)
            .map_err(|err| GatewayError::corrupt(format!("adding task event: {err}")))?;
        self.outbox.stage(ADDING_TASK_CREATED_TOPIC, payload);
        Ok(())
    }

    async fn commit(&self) -> Result<(), GatewayError> {
        self.outbox.flush().await
    }
}
