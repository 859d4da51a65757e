//! Username availability check.

use std::convert::Infallible;

use async_trait::async_trait;

use crate::domain::Username;
use crate::domain::handler::{Handler, HandlerResult};
use crate::domain::ports::GetUserByUsername;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckUsernameExistenceQuery {
    pub username: Username,
}

pub trait CheckUsernameExistenceGateway: GetUserByUsername {}

impl<T> CheckUsernameExistenceGateway for T where T: GetUserByUsername {}

pub struct CheckUsernameExistenceHandler<G> {
    gateway: G,
}

impl<G> CheckUsernameExistenceHandler<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G> Handler for CheckUsernameExistenceHandler<G>
where
    G: CheckUsernameExistenceGateway,
{
    type Input = CheckUsernameExistenceQuery;
    type Output = bool;
    type Rejection = Infallible;

    async fn handle(&self, input: CheckUsernameExistenceQuery) -> HandlerResult<bool, Infallible> {
        Ok(self
            .gateway
            .get_user_by_username(&input.username)
            .await?
            .is_some())
    }
}
