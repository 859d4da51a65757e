//! Credential check.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::handler::{Handler, HandlerError, HandlerResult};
use crate::domain::ports::{GetUserByUsername, PasswordEncoder};
use crate::domain::{Password, UserId, Username};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginQuery {
    pub username: Username,
    pub password: Password,
}

/// Unknown usernames, wrong passwords and deactivated accounts all look the
/// same to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("invalid username or password")]
    InvalidCredentials,
}

pub trait LoginGateway: GetUserByUsername {}

impl<T> LoginGateway for T where T: GetUserByUsername {}

pub struct LoginHandler<G> {
    gateway: G,
    password_encoder: Arc<dyn PasswordEncoder>,
}

impl<G> LoginHandler<G> {
    pub fn new(gateway: G, password_encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self {
            gateway,
            password_encoder,
        }
    }
}

#[async_trait]
impl<G> Handler for LoginHandler<G>
where
    G: LoginGateway,
{
    type Input = LoginQuery;
    type Output = UserId;
    type Rejection = LoginError;

    async fn handle(&self, input: LoginQuery) -> HandlerResult<UserId, LoginError> {
        let user = self
            .gateway
            .get_user_by_username(&input.username)
            .await?
            .filter(|user| user.is_active())
            .filter(|user| {
                self.password_encoder
                    .verify(input.password.expose(), user.password_hash())
            })
            .ok_or(HandlerError::Rejected(LoginError::InvalidCredentials))?;
        Ok(*user.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{GatewayError, MockGetUserByUsername, MockPasswordEncoder};
    use crate::domain::test_support::{RecordingGateway, password_encoder, user};
    use rstest::rstest;

    fn query(username: &str, password: &str) -> LoginQuery {
        LoginQuery {
            username: Username::new(username).expect("valid username"),
            password: Password::new(password).expect("valid password"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn correct_password_returns_user_id() {
        let alice = user("alice");
        let user_id = *alice.id();
        let gateway = RecordingGateway::new().with_user(alice);

        let logged_in = LoginHandler::new(gateway, password_encoder())
            .handle(query("alice", "pw"))
            .await
            .expect("login succeeds");

        assert_eq!(logged_in, user_id);
    }

    #[rstest]
    #[case("alice", "wrong")]
    #[case("mallory", "pw")]
    #[tokio::test]
    async fn bad_credentials_are_indistinguishable(#[case] username: &str, #[case] password: &str) {
        let gateway = RecordingGateway::new().with_user(user("alice"));

        let err = LoginHandler::new(gateway, password_encoder())
            .handle(query(username, password))
            .await
            .expect_err("login fails");

        assert_eq!(err, HandlerError::Rejected(LoginError::InvalidCredentials));
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_faults_skip_password_verification() {
        let mut gateway = MockGetUserByUsername::new();
        gateway
            .expect_get_user_by_username()
            .times(1)
            .returning(|_| Err(GatewayError::connection("refused")));
        let mut encoder = MockPasswordEncoder::new();
        encoder.expect_verify().never();

        let err = LoginHandler::new(gateway, Arc::new(encoder))
            .handle(query("alice", "pw"))
            .await
            .expect_err("fault propagates");

        assert_eq!(err, HandlerError::Unexpected(GatewayError::connection("refused")));
    }
}
