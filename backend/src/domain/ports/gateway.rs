//! Capability-scoped persistence contracts.
//!
//! Each trait exposes one operation. Handlers name the exact set they need
//! through a composed trait (see `domain::commands` and `domain::queries`),
//! so a handler's signature is its whole data-access contract.
//!
//! Writes are staged: `save_*`, `update_*` and `remove_*` become durable only
//! once [`Commit::commit`] succeeds.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{
    AddingTask, Movie, MovieId, User, UserId, UserMovieRating, Username,
};

define_port_error! {
    /// Infrastructure faults raised by any gateway or auxiliary service.
    pub enum GatewayError {
        /// The backing store could not be reached.
        Connection { message: String } => "gateway connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "gateway query failed: {message}",
        /// Stored data could not be mapped back into the domain.
        Corrupt { message: String } => "stored data is inconsistent: {message}",
        /// A password could not be encoded for storage.
        Encoding { message: String } => "password encoding failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckUserIdExistence: Send + Sync {
    async fn check_user_id_existence(&self, user_id: &UserId) -> Result<bool, GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GetUserById: Send + Sync {
    async fn get_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GetUserByUsername: Send + Sync {
    async fn get_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SaveUser: Send + Sync {
    async fn save_user(&self, user: &User) -> Result<(), GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpdateUser: Send + Sync {
    async fn update_user(&self, user: &User) -> Result<(), GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GetMovieById: Send + Sync {
    async fn get_movie_by_id(&self, movie_id: &MovieId) -> Result<Option<Movie>, GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SaveMovie: Send + Sync {
    async fn save_movie(&self, movie: &Movie) -> Result<(), GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpdateMovie: Send + Sync {
    async fn update_movie(&self, movie: &Movie) -> Result<(), GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GetUserMovieRating: Send + Sync {
    async fn get_user_movie_rating(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<Option<UserMovieRating>, GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SaveUserMovieRating: Send + Sync {
    async fn save_user_movie_rating(&self, rating: &UserMovieRating) -> Result<(), GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpdateUserMovieRating: Send + Sync {
    async fn update_user_movie_rating(&self, rating: &UserMovieRating)
        -> Result<(), GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoveUserMovieRating: Send + Sync {
    async fn remove_user_movie_rating(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<(), GatewayError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SaveAddingTask: Send + Sync {
    async fn save_adding_task(&self, task: &AddingTask) -> Result<(), GatewayError>;
}

/// Unit-of-work boundary: flushes every staged write atomically.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Commit: Send + Sync {
    async fn commit(&self) -> Result<(), GatewayError>;
}

/// Every persistence capability; implemented by full database adapters.
pub trait DatabaseGateway:
    CheckUserIdExistence
    + GetUserById
    + GetUserByUsername
    + SaveUser
    + UpdateUser
    + GetMovieById
    + SaveMovie
    + UpdateMovie
    + GetUserMovieRating
    + SaveUserMovieRating
    + UpdateUserMovieRating
    + RemoveUserMovieRating
    + SaveAddingTask
    + Commit
{
}

impl<T> DatabaseGateway for T where
    T: CheckUserIdExistence
        + GetUserById
        + GetUserByUsername
        + SaveUser
        + UpdateUser
        + GetMovieById
        + SaveMovie
        + UpdateMovie
        + GetUserMovieRating
        + SaveUserMovieRating
        + UpdateUserMovieRating
        + RemoveUserMovieRating
        + SaveAddingTask
        + Commit
{
}
