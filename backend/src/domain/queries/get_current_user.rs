//! Profile of the signed-in user, served through the user cache.
//!
//! Cache misses fall back to the database and repopulate the cache. The
//! refill is conditional, so a snapshot written by a concurrent command is
//! never replaced by the older row read here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::handler::{Handler, HandlerError, HandlerResult};
use crate::domain::ports::{GetUserById, UserCache};
use crate::domain::{User, UserId, Username};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetCurrentUserQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GetCurrentUserError {
    #[error("user {user_id} does not exist")]
    UserDoesNotExist { user_id: UserId },
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: Username,
    pub is_confirmed: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id(),
            username: user.username().clone(),
            is_confirmed: user.is_confirmed(),
            is_active: user.is_active(),
            created_at: user.created_at(),
        }
    }
}

pub trait GetCurrentUserGateway: GetUserById {}

impl<T> GetCurrentUserGateway for T where T: GetUserById {}

pub struct GetCurrentUserHandler<G, C> {
    gateway: G,
    cache: C,
}

impl<G, C> GetCurrentUserHandler<G, C> {
    pub fn new(gateway: G, cache: C) -> Self {
        Self { gateway, cache }
    }
}

#[async_trait]
impl<G, C> Handler for GetCurrentUserHandler<G, C>
where
    G: GetCurrentUserGateway,
    C: UserCache,
{
    type Input = GetCurrentUserQuery;
    type Output = CurrentUser;
    type Rejection = GetCurrentUserError;

    async fn handle(
        &self,
        input: GetCurrentUserQuery,
    ) -> HandlerResult<CurrentUser, GetCurrentUserError> {
        let user_id = input.user_id;
        if let Some(user) = self.cache.get_user(&user_id).await? {
            return Ok(CurrentUser::from(&user));
        }

        let user = self.gateway.get_user_by_id(&user_id).await?.ok_or(
            HandlerError::Rejected(GetCurrentUserError::UserDoesNotExist { user_id }),
        )?;
        self.cache.fill_user(&user).await?;
        self.cache.commit().await?;
        Ok(CurrentUser::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::{ConfirmUserCommand, ConfirmUserHandler};
    use crate::domain::ports::GatewayError;
    use crate::domain::test_support::{
        RecordingCache, RecordingGateway, RecordingQueue, confirmed_user, fixture_clock, user,
    };
    use rstest::rstest;

    /// Returns the row as it was before a confirmation that commits while
    /// the read is in flight.
    struct ConfirmDuringRead {
        stale: User,
        confirm: ConfirmUserHandler<RecordingGateway, RecordingCache, RecordingQueue>,
    }

    #[async_trait]
    impl GetUserById for ConfirmDuringRead {
        async fn get_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, GatewayError> {
            self.confirm
                .handle(ConfirmUserCommand { user_id: *user_id })
                .await
                .expect("confirmation succeeds");
            Ok(Some(self.stale.clone()))
        }
    }

    #[rstest]
    #[tokio::test]
    async fn cache_hit_skips_database() {
        let alice = confirmed_user("alice");
        let user_id = *alice.id();
        let gateway = RecordingGateway::new();
        let cache = RecordingCache::new().with_user(alice);

        let current = GetCurrentUserHandler::new(gateway, cache.clone())
            .handle(GetCurrentUserQuery { user_id })
            .await
            .expect("cached user");

        assert_eq!(current.id, user_id);
        assert!(current.is_confirmed);
        assert_eq!(cache.commits(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn cache_miss_reads_through_and_fills_cache() {
        let alice = user("alice");
        let user_id = *alice.id();
        let gateway = RecordingGateway::new().with_user(alice);
        let cache = RecordingCache::new();

        let current = GetCurrentUserHandler::new(gateway, cache.clone())
            .handle(GetCurrentUserQuery { user_id })
            .await
            .expect("stored user");

        assert_eq!(current.username.as_ref(), "alice");
        assert!(cache.cached(&user_id).is_some());
        assert_eq!(cache.reads(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let user_id = UserId::random();
        let cache = RecordingCache::new();

        let err = GetCurrentUserHandler::new(RecordingGateway::new(), cache.clone())
            .handle(GetCurrentUserQuery { user_id })
            .await
            .expect_err("unknown user");

        assert_eq!(
            err,
            HandlerError::Rejected(GetCurrentUserError::UserDoesNotExist { user_id })
        );
        assert_eq!(cache.commits(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn stale_read_does_not_overwrite_concurrent_confirmation() {
        let alice = user("alice");
        let user_id = *alice.id();
        let cache = RecordingCache::new();
        let gateway = ConfirmDuringRead {
            stale: alice.clone(),
            confirm: ConfirmUserHandler::new(
                RecordingGateway::new().with_user(alice),
                cache.clone(),
                RecordingQueue::new(),
                fixture_clock(),
            ),
        };
        let handler = GetCurrentUserHandler::new(gateway, cache.clone());

        handler
            .handle(GetCurrentUserQuery { user_id })
            .await
            .expect("stored user");

        assert!(cache.cached(&user_id).expect("cached").is_confirmed());
        let current = handler
            .handle(GetCurrentUserQuery { user_id })
            .await
            .expect("cached user");
        assert!(current.is_confirmed);
    }
}
