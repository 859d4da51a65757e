//! Per-connection chat state and command dispatch.

use std::sync::Arc;

use tracing::info;

use crate::domain::commands::{
    ConfirmUserCommand, CreateAddingTaskCommand, CreateMovieCommand, MovieRatingSummary,
    RateMovieCommand, ReevaluateMovieCommand, RegisterCommand, RemoveUserMovieRatingCommand,
};
use crate::domain::ports::Interactor;
use crate::domain::queries::{GetCurrentUserQuery, GetMovieQuery, LoginQuery};
use crate::domain::{MovieId, RatingValue, UserId};

use super::command::{BotCommand, HELP_TEXT, ParseError};
use super::replies::{LOGIN_REQUIRED, failure_reply};

/// One chat, optionally bound to a logged-in user.
pub struct BotConversation {
    interactor: Arc<dyn Interactor>,
    user_id: Option<UserId>,
}

fn summary_line(summary: &MovieRatingSummary) -> String {
    format!(
        "Average is now {:.1} from {} rating(s).",
        summary.average_rating, summary.rating_count
    )
}

impl BotConversation {
    pub fn new(interactor: Arc<dyn Interactor>) -> Self {
        Self {
            interactor,
            user_id: None,
        }
    }

    /// The user this chat is logged in as.
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Produce the reply to one chat message. Never fails; every outcome is
    /// rendered as text.
    pub async fn respond(&mut self, text: &str) -> String {
        match BotCommand::parse(text) {
            Ok(command) => self.dispatch(command).await,
            Err(ParseError::NotACommand | ParseError::Unknown(_)) => {
                format!("I don't know that one.\n{HELP_TEXT}")
            }
            Err(ParseError::Usage(usage)) => format!("Usage: {usage}"),
            Err(ParseError::Invalid(reason)) => reason,
        }
    }

    async fn dispatch(&mut self, command: BotCommand) -> String {
        match command {
            BotCommand::Help => HELP_TEXT.to_owned(),
            BotCommand::Register(credentials) => {
                let (username, password) = credentials.into_parts();
                let shown = username.to_string();
                match self
                    .interactor
                    .register(RegisterCommand { username, password })
                    .await
                {
                    Ok(user_id) => format!(
                        "Welcome, {shown}! Your id is {user_id}. Log in with /login to continue."
                    ),
                    Err(err) => failure_reply(&err),
                }
            }
            BotCommand::Login(credentials) => {
                let (username, password) = credentials.into_parts();
                let shown = username.to_string();
                match self
                    .interactor
                    .login(LoginQuery { username, password })
                    .await
                {
                    Ok(user_id) => {
                        info!(%user_id, "chat logged in");
                        self.user_id = Some(user_id);
                        format!("Logged in as {shown}.")
                    }
                    Err(err) => failure_reply(&err),
                }
            }
            BotCommand::Me => match self.user_id {
                Some(user_id) => self.me(user_id).await,
                None => LOGIN_REQUIRED.to_owned(),
            },
            BotCommand::Confirm => match self.user_id {
                Some(user_id) => match self
                    .interactor
                    .confirm_user(ConfirmUserCommand { user_id })
                    .await
                {
                    Ok(()) => "Your account is confirmed.".to_owned(),
                    Err(err) => failure_reply(&err),
                },
                None => LOGIN_REQUIRED.to_owned(),
            },
            BotCommand::Movie(movie_id) => {
                match self.interactor.get_movie(GetMovieQuery { movie_id }).await {
                    Ok(movie) => format!(
                        "{}\nRating: {:.1} from {} rating(s)\nId: {}",
                        movie.title.as_ref(),
                        movie.average_rating,
                        movie.rating_count,
                        movie.id
                    ),
                    Err(err) => failure_reply(&err),
                }
            }
            BotCommand::AddMovie(title) => {
                if self.user_id.is_none() {
                    return LOGIN_REQUIRED.to_owned();
                }
                let shown = title.as_ref().to_owned();
                match self
                    .interactor
                    .create_movie(CreateMovieCommand { title })
                    .await
                {
                    Ok(movie_id) => format!("Added \"{shown}\" as {movie_id}."),
                    Err(err) => failure_reply(&err),
                }
            }
            BotCommand::Rate { movie_id, rating } => self.rate(movie_id, rating).await,
            BotCommand::Rerate { movie_id, rating } => self.rerate(movie_id, rating).await,
            BotCommand::Unrate(movie_id) => self.unrate(movie_id).await,
            BotCommand::Request {
                adding_type,
                kinopoisk_id,
            } => {
                let Some(creator_id) = self.user_id else {
                    return LOGIN_REQUIRED.to_owned();
                };
                match self
                    .interactor
                    .create_adding_task(CreateAddingTaskCommand {
                        creator_id,
                        adding_type,
                        kinopoisk_id,
                    })
                    .await
                {
                    Ok(task_id) => format!(
                        "Import of {} queued as request {task_id}.",
                        adding_type.as_str()
                    ),
                    Err(err) => failure_reply(&err),
                }
            }
        }
    }

    async fn me(&self, user_id: UserId) -> String {
        match self
            .interactor
            .get_current_user(GetCurrentUserQuery { user_id })
            .await
        {
            Ok(user) => format!(
                "{} ({})\nConfirmed: {}\nMember since {}",
                user.username,
                user.id,
                if user.is_confirmed { "yes" } else { "no" },
                user.created_at.format("%Y-%m-%d")
            ),
            Err(err) => failure_reply(&err),
        }
    }

    async fn rate(&self, movie_id: MovieId, rating: RatingValue) -> String {
        let Some(user_id) = self.user_id else {
            return LOGIN_REQUIRED.to_owned();
        };
        match self
            .interactor
            .rate_movie(RateMovieCommand {
                user_id,
                movie_id,
                rating,
            })
            .await
        {
            Ok(summary) => format!("Rated {rating}. {}", summary_line(&summary)),
            Err(err) => failure_reply(&err),
        }
    }

    async fn rerate(&self, movie_id: MovieId, rating: RatingValue) -> String {
        let Some(user_id) = self.user_id else {
            return LOGIN_REQUIRED.to_owned();
        };
        match self
            .interactor
            .reevaluate_movie(ReevaluateMovieCommand {
                user_id,
                movie_id,
                rating,
            })
            .await
        {
            Ok(reevaluated) => format!(
                "Rating changed to {}. {}",
                reevaluated.user_rating,
                summary_line(&reevaluated.movie)
            ),
            Err(err) => failure_reply(&err),
        }
    }

    async fn unrate(&self, movie_id: MovieId) -> String {
        let Some(user_id) = self.user_id else {
            return LOGIN_REQUIRED.to_owned();
        };
        match self
            .interactor
            .remove_user_movie_rating(RemoveUserMovieRatingCommand { user_id, movie_id })
            .await
        {
            Ok(summary) => format!("Rating removed. {}", summary_line(&summary)),
            Err(err) => failure_reply(&err),
        }
    }
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;
