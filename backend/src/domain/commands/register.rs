//! Account registration.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::handler::{Handler, HandlerError, HandlerResult};
use crate::domain::ports::{Commit, GetUserByUsername, PasswordEncoder, SaveUser};
use crate::domain::{Password, User, UserId, Username};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterCommand {
    pub username: Username,
    pub password: Password,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("username {username} is already taken")]
    UsernameAlreadyExists { username: Username },
}

pub trait RegisterGateway: GetUserByUsername + SaveUser + Commit {}

impl<T> RegisterGateway for T where T: GetUserByUsername + SaveUser + Commit {}

/// Creates an unconfirmed account with an encoded password.
pub struct RegisterHandler<G> {
    gateway: G,
    password_encoder: Arc<dyn PasswordEncoder>,
    clock: Arc<dyn Clock>,
}

impl<G> RegisterHandler<G> {
    pub fn new(
        gateway: G,
        password_encoder: Arc<dyn PasswordEncoder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            password_encoder,
            clock,
        }
    }
}

#[async_trait]
impl<G> Handler for RegisterHandler<G>
where
    G: RegisterGateway,
{
    type Input = RegisterCommand;
    type Output = UserId;
    type Rejection = RegisterError;

    async fn handle(&self, input: RegisterCommand) -> HandlerResult<UserId, RegisterError> {
        let RegisterCommand { username, password } = input;
        if self.gateway.get_user_by_username(&username).await?.is_some() {
            return Err(HandlerError::Rejected(RegisterError::UsernameAlreadyExists {
                username,
            }));
        }

        let password_hash = self.password_encoder.encode(password.expose())?;
        let user = User::create(UserId::random(), username, password_hash, self.clock.utc());
        self.gateway.save_user(&user).await?;
        self.gateway.commit().await?;
        Ok(*user.id())
    }
}
