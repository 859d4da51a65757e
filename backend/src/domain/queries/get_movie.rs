//! Movie lookup.

use async_trait::async_trait;

use crate::domain::handler::{Handler, HandlerError, HandlerResult};
use crate::domain::ports::GetMovieById;
use crate::domain::{Movie, MovieId, MovieTitle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetMovieQuery {
    pub movie_id: MovieId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GetMovieError {
    #[error("movie {movie_id} does not exist")]
    MovieDoesNotExist { movie_id: MovieId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: MovieTitle,
    pub average_rating: f64,
    pub rating_count: u64,
}

impl From<&Movie> for MovieDetails {
    fn from(movie: &Movie) -> Self {
        Self {
            id: *movie.id(),
            title: movie.title().clone(),
            average_rating: movie.average_rating(),
            rating_count: movie.rating_count(),
        }
    }
}

pub trait GetMovieGateway: GetMovieById {}

impl<T> GetMovieGateway for T where T: GetMovieById {}

pub struct GetMovieHandler<G> {
    gateway: G,
}

impl<G> GetMovieHandler<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G> Handler for GetMovieHandler<G>
where
    G: GetMovieGateway,
{
    type Input = GetMovieQuery;
    type Output = MovieDetails;
    type Rejection = GetMovieError;

    async fn handle(&self, input: GetMovieQuery) -> HandlerResult<MovieDetails, GetMovieError> {
        let movie_id = input.movie_id;
        let movie = self
            .gateway
            .get_movie_by_id(&movie_id)
            .await?
            .ok_or(HandlerError::Rejected(GetMovieError::MovieDoesNotExist { movie_id }))?;
        Ok(MovieDetails::from(&movie))
    }
}
