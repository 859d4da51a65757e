//! Change an existing rating.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::MovieRatingSummary;
use crate::domain::handler::{Handler, HandlerError, HandlerResult};
use crate::domain::ports::{
    CheckUserIdExistence, Commit, GatewayError, GetMovieById, GetUserMovieRating, UpdateMovie,
    UpdateUserMovieRating,
};
use crate::domain::{MovieId, RatingValue, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReevaluateMovieCommand {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: RatingValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReevaluateMovieError {
    #[error("user {user_id} does not exist")]
    UserDoesNotExist { user_id: UserId },
    #[error("movie {movie_id} does not exist")]
    MovieDoesNotExist { movie_id: MovieId },
    #[error("movie {movie_id} has not been rated by this user")]
    UserMovieRatingDoesNotExist { movie_id: MovieId },
}

/// New user rating alongside the movie's updated aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReevaluatedRating {
    pub user_rating: RatingValue,
    pub movie: MovieRatingSummary,
}

pub trait ReevaluateMovieGateway:
    CheckUserIdExistence
    + GetMovieById
    + GetUserMovieRating
    + UpdateUserMovieRating
    + UpdateMovie
    + Commit
{
}

impl<T> ReevaluateMovieGateway for T where
    T: CheckUserIdExistence
        + GetMovieById
        + GetUserMovieRating
        + UpdateUserMovieRating
        + UpdateMovie
        + Commit
{
}

pub struct ReevaluateMovieHandler<G> {
    gateway: G,
    clock: Arc<dyn Clock>,
}

impl<G> ReevaluateMovieHandler<G> {
    pub fn new(gateway: G, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }
}

#[async_trait]
impl<G> Handler for ReevaluateMovieHandler<G>
where
    G: ReevaluateMovieGateway,
{
    type Input = ReevaluateMovieCommand;
    type Output = ReevaluatedRating;
    type Rejection = ReevaluateMovieError;

    async fn handle(
        &self,
        input: ReevaluateMovieCommand,
    ) -> HandlerResult<ReevaluatedRating, ReevaluateMovieError> {
        let ReevaluateMovieCommand {
            user_id,
            movie_id,
            rating,
        } = input;

        if !self.gateway.check_user_id_existence(&user_id).await? {
            return Err(HandlerError::Rejected(
                ReevaluateMovieError::UserDoesNotExist { user_id },
            ));
        }
        let mut movie = self.gateway.get_movie_by_id(&movie_id).await?.ok_or(
            HandlerError::Rejected(ReevaluateMovieError::MovieDoesNotExist { movie_id }),
        )?;
        let mut user_movie_rating = self
            .gateway
            .get_user_movie_rating(&user_id, &movie_id)
            .await?
            .ok_or(HandlerError::Rejected(
                ReevaluateMovieError::UserMovieRatingDoesNotExist { movie_id },
            ))?;

        // A stored rating the aggregate never counted means the rows drifted.
        movie
            .remove_rating(user_movie_rating.rating())
            .map_err(|underflow| GatewayError::corrupt(underflow.to_string()))?;
        movie.add_rating(rating);
        user_movie_rating.update(rating, self.clock.utc());

        self.gateway.update_user_movie_rating(&user_movie_rating).await?;
        self.gateway.update_movie(&movie).await?;
        self.gateway.commit().await?;
        Ok(ReevaluatedRating {
            user_rating: rating,
            movie: MovieRatingSummary::from(&movie),
        })
    }
}
