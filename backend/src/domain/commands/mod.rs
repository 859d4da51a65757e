//! Command handlers: one per state-changing use case.
//!
//! Each handler resolves the entities it references, checks preconditions,
//! mutates through entity methods, stages writes and commits once.

mod confirm_user;
mod create_adding_task;
mod create_movie;
mod rate_movie;
mod reevaluate_movie;
mod register;
mod remove_user_movie_rating;

pub use confirm_user::{
    ConfirmUserCommand, ConfirmUserError, ConfirmUserGateway, ConfirmUserHandler,
};
pub use create_adding_task::{
    CreateAddingTaskCommand, CreateAddingTaskError, CreateAddingTaskGateway,
    CreateAddingTaskHandler,
};
pub use create_movie::{CreateMovieCommand, CreateMovieGateway, CreateMovieHandler};
pub use rate_movie::{RateMovieCommand, RateMovieError, RateMovieGateway, RateMovieHandler};
pub use reevaluate_movie::{
    ReevaluateMovieCommand, ReevaluateMovieError, ReevaluateMovieGateway, ReevaluateMovieHandler,
    ReevaluatedRating,
};
pub use register::{RegisterCommand, RegisterError, RegisterGateway, RegisterHandler};
pub use remove_user_movie_rating::{
    RemoveUserMovieRatingCommand, RemoveUserMovieRatingError, RemoveUserMovieRatingGateway,
    RemoveUserMovieRatingHandler,
};

use super::{Movie, MovieId};

/// Aggregate rating state of a movie after a rating change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovieRatingSummary {
    pub movie_id: MovieId,
    pub average_rating: f64,
    pub rating_count: u64,
}

impl From<&Movie> for MovieRatingSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            movie_id: *movie.id(),
            average_rating: movie.average_rating(),
            rating_count: movie.rating_count(),
        }
    }
}
