//! Catalogue a new movie.

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::handler::{Handler, HandlerResult};
use crate::domain::ports::{Commit, SaveMovie};
use crate::domain::{Movie, MovieId, MovieTitle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMovieCommand {
    pub title: MovieTitle,
}

pub trait CreateMovieGateway: SaveMovie + Commit {}

impl<T> CreateMovieGateway for T where T: SaveMovie + Commit {}

pub struct CreateMovieHandler<G> {
    gateway: G,
    clock: Arc<dyn Clock>,
}

impl<G> CreateMovieHandler<G> {
    pub fn new(gateway: G, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }
}

#[async_trait]
impl<G> Handler for CreateMovieHandler<G>
where
    G: CreateMovieGateway,
{
    type Input = CreateMovieCommand;
    type Output = MovieId;
    type Rejection = Infallible;

    async fn handle(&self, input: CreateMovieCommand) -> HandlerResult<MovieId, Infallible> {
        let movie = Movie::create(MovieId::random(), input.title, self.clock.utc());
        self.gateway.save_movie(&movie).await?;
        self.gateway.commit().await?;
        Ok(*movie.id())
    }
}
