//! First rating of a movie by a user.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::MovieRatingSummary;
use crate::domain::handler::{Handler, HandlerError, HandlerResult};
use crate::domain::ports::{
    CheckUserIdExistence, Commit, GetMovieById, GetUserMovieRating, SaveUserMovieRating,
    UpdateMovie,
};
use crate::domain::{MovieId, RatingValue, UserId, UserMovieRating};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateMovieCommand {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: RatingValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RateMovieError {
    #[error("user {user_id} does not exist")]
    UserDoesNotExist { user_id: UserId },
    #[error("movie {movie_id} does not exist")]
    MovieDoesNotExist { movie_id: MovieId },
    #[error("movie {movie_id} is already rated by this user")]
    UserMovieRatingAlreadyExists { movie_id: MovieId },
}

pub trait RateMovieGateway:
    CheckUserIdExistence
    + GetMovieById
    + GetUserMovieRating
    + SaveUserMovieRating
    + UpdateMovie
    + Commit
{
}

impl<T> RateMovieGateway for T where
    T: CheckUserIdExistence
        + GetMovieById
        + GetUserMovieRating
        + SaveUserMovieRating
        + UpdateMovie
        + Commit
{
}

pub struct RateMovieHandler<G> {
    gateway: G,
    clock: Arc<dyn Clock>,
}

impl<G> RateMovieHandler<G> {
    pub fn new(gateway: G, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }
}

#[async_trait]
impl<G> Handler for RateMovieHandler<G>
where
    G: RateMovieGateway,
{
    type Input = RateMovieCommand;
    type Output = MovieRatingSummary;
    type Rejection = RateMovieError;

    async fn handle(
        &self,
        input: RateMovieCommand,
    ) -> HandlerResult<MovieRatingSummary, RateMovieError> {
        let RateMovieCommand {
            user_id,
            movie_id,
            rating,
        } = input;

        if !self.gateway.check_user_id_existence(&user_id).await? {
            return Err(HandlerError::Rejected(RateMovieError::UserDoesNotExist {
                user_id,
            }));
        }
        let mut movie = self
            .gateway
            .get_movie_by_id(&movie_id)
            .await?
            .ok_or(HandlerError::Rejected(RateMovieError::MovieDoesNotExist { movie_id }))?;
        if self
            .gateway
            .get_user_movie_rating(&user_id, &movie_id)
            .await?
            .is_some()
        {
            return Err(HandlerError::Rejected(
                RateMovieError::UserMovieRatingAlreadyExists { movie_id },
            ));
        }

        movie.add_rating(rating);
        let user_movie_rating =
            UserMovieRating::create(user_id, movie_id, rating, self.clock.utc());

        self.gateway.save_user_movie_rating(&user_movie_rating).await?;
        self.gateway.update_movie(&movie).await?;
        self.gateway.commit().await?;
        Ok(MovieRatingSummary::from(&movie))
    }
}
