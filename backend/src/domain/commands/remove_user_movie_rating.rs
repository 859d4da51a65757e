//! Withdraw a rating.

use async_trait::async_trait;

use super::MovieRatingSummary;
use crate::domain::handler::{Handler, HandlerError, HandlerResult};
use crate::domain::ports::{
    CheckUserIdExistence, Commit, GatewayError, GetMovieById, GetUserMovieRating,
    RemoveUserMovieRating, UpdateMovie,
};
use crate::domain::{MovieId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveUserMovieRatingCommand {
    pub user_id: UserId,
    pub movie_id: MovieId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RemoveUserMovieRatingError {
    #[error("user {user_id} does not exist")]
    UserDoesNotExist { user_id: UserId },
    #[error("movie {movie_id} does not exist")]
    MovieDoesNotExist { movie_id: MovieId },
    #[error("movie {movie_id} has not been rated by this user")]
    UserMovieRatingDoesNotExist { movie_id: MovieId },
}

pub trait RemoveUserMovieRatingGateway:
    CheckUserIdExistence
    + GetMovieById
    + GetUserMovieRating
    + RemoveUserMovieRating
    + UpdateMovie
    + Commit
{
}

impl<T> RemoveUserMovieRatingGateway for T where
    T: CheckUserIdExistence
        + GetMovieById
        + GetUserMovieRating
        + RemoveUserMovieRating
        + UpdateMovie
        + Commit
{
}

pub struct RemoveUserMovieRatingHandler<G> {
    gateway: G,
}

impl<G> RemoveUserMovieRatingHandler<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G> Handler for RemoveUserMovieRatingHandler<G>
where
    G: RemoveUserMovieRatingGateway,
{
    type Input = RemoveUserMovieRatingCommand;
    type Output = MovieRatingSummary;
    type Rejection = RemoveUserMovieRatingError;

    async fn handle(
        &self,
        input: RemoveUserMovieRatingCommand,
    ) -> HandlerResult<MovieRatingSummary, RemoveUserMovieRatingError> {
        let RemoveUserMovieRatingCommand { user_id, movie_id } = input;

        if !self.gateway.check_user_id_existence(&user_id).await? {
            return Err(HandlerError::Rejected(
                RemoveUserMovieRatingError::UserDoesNotExist { user_id },
            ));
        }
        let mut movie = self.gateway.get_movie_by_id(&movie_id).await?.ok_or(
            HandlerError::Rejected(RemoveUserMovieRatingError::MovieDoesNotExist { movie_id }),
        )?;
        let user_movie_rating = self
            .gateway
            .get_user_movie_rating(&user_id, &movie_id)
            .await?
            .ok_or(HandlerError::Rejected(
                RemoveUserMovieRatingError::UserMovieRatingDoesNotExist { movie_id },
            ))?;

        movie
            .remove_rating(user_movie_rating.rating())
            .map_err(|underflow| GatewayError::corrupt(underflow.to_string()))?;

        self.gateway.remove_user_movie_rating(&user_id, &movie_id).await?;
        self.gateway.update_movie(&movie).await?;
        self.gateway.commit().await?;
        Ok(MovieRatingSummary::from(&movie))
    }
}
