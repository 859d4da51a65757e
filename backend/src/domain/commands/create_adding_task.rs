//! Request a title import from an external catalogue.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::handler::{Handler, HandlerError, HandlerResult};
use crate::domain::ports::{CheckUserIdExistence, Commit, EventBus, SaveAddingTask};
use crate::domain::{AddingTask, AddingTaskId, AddingTaskType, KinopoiskId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAddingTaskCommand {
    pub creator_id: UserId,
    pub adding_type: AddingTaskType,
    pub kinopoisk_id: KinopoiskId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CreateAddingTaskError {
    #[error("user {user_id} does not exist")]
    UserDoesNotExist { user_id: UserId },
}

pub trait CreateAddingTaskGateway: CheckUserIdExistence + SaveAddingTask + Commit {}

impl<T> CreateAddingTaskGateway for T where T: CheckUserIdExistence + SaveAddingTask + Commit {}

/// Stores a pending task and announces it on the event bus.
pub struct CreateAddingTaskHandler<G, E> {
    gateway: G,
    events: E,
    clock: Arc<dyn Clock>,
}

impl<G, E> CreateAddingTaskHandler<G, E> {
    pub fn new(gateway: G, events: E, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            events,
            clock,
        }
    }
}

#[async_trait]
impl<G, E> Handler for CreateAddingTaskHandler<G, E>
where
    G: CreateAddingTaskGateway,
    E: EventBus,
{
    type Input = CreateAddingTaskCommand;
    type Output = AddingTaskId;
    type Rejection = CreateAddingTaskError;

    async fn handle(
        &self,
        input: CreateAddingTaskCommand,
    ) -> HandlerResult<AddingTaskId, CreateAddingTaskError> {
        let CreateAddingTaskCommand {
            creator_id,
            adding_type,
            kinopoisk_id,
        } = input;

        if !self.gateway.check_user_id_existence(&creator_id).await? {
            return Err(HandlerError::Rejected(
                CreateAddingTaskError::UserDoesNotExist {
                    user_id: creator_id,
                },
            ));
        }

        let task = AddingTask::create(
            AddingTaskId::random(),
            creator_id,
            adding_type,
            kinopoisk_id,
            self.clock.utc(),
        );
        self.gateway.save_adding_task(&task).await?;
        self.events
            .publish_adding_task_created(&task.created_event())
            .await?;

        self.gateway.commit().await?;
        self.events.commit().await?;
        Ok(*task.id())
    }
}
