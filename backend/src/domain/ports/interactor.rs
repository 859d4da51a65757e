//! Driving port consumed by the HTTP API and the chat bot.

use std::convert::Infallible;

use async_trait::async_trait;

use crate::domain::commands::{
    ConfirmUserCommand, ConfirmUserError, CreateAddingTaskCommand, CreateAddingTaskError,
    CreateMovieCommand, MovieRatingSummary, RateMovieCommand, RateMovieError,
    ReevaluateMovieCommand, ReevaluateMovieError, ReevaluatedRating, RegisterCommand,
    RegisterError, RemoveUserMovieRatingCommand, RemoveUserMovieRatingError,
};
use crate::domain::handler::HandlerResult;
use crate::domain::queries::{
    CheckUsernameExistenceQuery, CurrentUser, GetCurrentUserError, GetCurrentUserQuery,
    GetMovieError, GetMovieQuery, LoginError, LoginQuery, MovieDetails,
};
use crate::domain::{AddingTaskId, MovieId, UserId};

/// Single dispatch surface over every use case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Interactor: Send + Sync {
    async fn register(&self, command: RegisterCommand) -> HandlerResult<UserId, RegisterError>;

    async fn confirm_user(
        &self,
        command: ConfirmUserCommand,
    ) -> HandlerResult<(), ConfirmUserError>;

    async fn create_movie(
        &self,
        command: CreateMovieCommand,
    ) -> HandlerResult<MovieId, Infallible>;

    async fn rate_movie(
        &self,
        command: RateMovieCommand,
    ) -> HandlerResult<MovieRatingSummary, RateMovieError>;

    async fn reevaluate_movie(
        &self,
        command: ReevaluateMovieCommand,
    ) -> HandlerResult<ReevaluatedRating, ReevaluateMovieError>;

    async fn remove_user_movie_rating(
        &self,
        command: RemoveUserMovieRatingCommand,
    ) -> HandlerResult<MovieRatingSummary, RemoveUserMovieRatingError>;

    async fn create_adding_task(
        &self,
        command: CreateAddingTaskCommand,
    ) -> HandlerResult<AddingTaskId, CreateAddingTaskError>;

    async fn login(&self, query: LoginQuery) -> HandlerResult<UserId, LoginError>;

    async fn check_username_existence(
        &self,
        query: CheckUsernameExistenceQuery,
    ) -> HandlerResult<bool, Infallible>;

    async fn get_current_user(
        &self,
        query: GetCurrentUserQuery,
    ) -> HandlerResult<CurrentUser, GetCurrentUserError>;

    async fn get_movie(&self, query: GetMovieQuery) -> HandlerResult<MovieDetails, GetMovieError>;
}
