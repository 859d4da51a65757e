//! Account confirmation.
//!
//! Confirming fans out to three stores: the user table, the user cache and
//! the greeting-email queue. Staging and committing each run concurrently and
//! every branch completes before the first failure is reported. Nothing is
//! rolled back, so a failed cache commit still leaves the database updated.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::handler::{Handler, HandlerError, HandlerResult};
use crate::domain::ports::{Commit, GetUserById, TaskQueue, UpdateUser, UserCache};
use crate::domain::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmUserCommand {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfirmUserError {
    #[error("user {user_id} does not exist")]
    UserDoesNotExist { user_id: UserId },
    #[error("user {user_id} is already confirmed")]
    UserAlreadyConfirmed { user_id: UserId },
}

pub trait ConfirmUserGateway: GetUserById + UpdateUser + Commit {}

impl<T> ConfirmUserGateway for T where T: GetUserById + UpdateUser + Commit {}

pub struct ConfirmUserHandler<G, C, Q> {
    gateway: G,
    cache: C,
    queue: Q,
    clock: Arc<dyn Clock>,
}

impl<G, C, Q> ConfirmUserHandler<G, C, Q> {
    pub fn new(gateway: G, cache: C, queue: Q, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            cache,
            queue,
            clock,
        }
    }
}

#[async_trait]
impl<G, C, Q> Handler for ConfirmUserHandler<G, C, Q>
where
    G: ConfirmUserGateway,
    C: UserCache,
    Q: TaskQueue,
{
    type Input = ConfirmUserCommand;
    type Output = ();
    type Rejection = ConfirmUserError;

    async fn handle(&self, input: ConfirmUserCommand) -> HandlerResult<(), ConfirmUserError> {
        let user_id = input.user_id;
        let mut user = self
            .gateway
            .get_user_by_id(&user_id)
            .await?
            .ok_or(HandlerError::Rejected(ConfirmUserError::UserDoesNotExist { user_id }))?;

        user.confirm(self.clock.utc()).map_err(|already| {
            HandlerError::Rejected(ConfirmUserError::UserAlreadyConfirmed {
                user_id: already.user_id,
            })
        })?;

        let (stored, cached, queued) = tokio::join!(
            self.gateway.update_user(&user),
            self.cache.update_user(&user),
            self.queue.enqueue_send_greeting_email(&user_id),
        );
        stored?;
        cached?;
        queued?;

        let (stored, cached, queued) = tokio::join!(
            self.gateway.commit(),
            self.cache.commit(),
            self.queue.commit(),
        );
        stored?;
        cached?;
        queued?;
        Ok(())
    }
}
