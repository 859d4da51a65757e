//! Translation of use-case outcomes into HTTP error payloads.
//!
//! Every rejection enum is matched exhaustively so a new variant fails to
//! compile here until it has a response. Not-found and conflict payloads carry
//! a stable `details.code` alongside the offending identifier.

use std::convert::Infallible;

use serde_json::json;

use crate::domain::commands::{
    ConfirmUserError, CreateAddingTaskError, RateMovieError, ReevaluateMovieError, RegisterError,
    RemoveUserMovieRatingError,
};
use crate::domain::ports::GatewayError;
use crate::domain::queries::{GetCurrentUserError, GetMovieError, LoginError};
use crate::domain::{Error, HandlerError, MovieId, UserId};

impl<E> From<HandlerError<E>> for Error
where
    Error: From<E>,
{
    fn from(err: HandlerError<E>) -> Self {
        match err {
            HandlerError::Rejected(rejection) => Error::from(rejection),
            HandlerError::Unexpected(GatewayError::Connection { .. }) => {
                Error::service_unavailable("storage is temporarily unavailable")
            }
            HandlerError::Unexpected(_) => Error::internal("Internal server error"),
        }
    }
}

impl From<Infallible> for Error {
    fn from(err: Infallible) -> Self {
        match err {}
    }
}

fn user_not_found(user_id: UserId) -> Error {
    Error::not_found(format!("user {user_id} does not exist"))
        .with_details(json!({ "code": "user_not_found", "userId": user_id }))
}

fn movie_not_found(movie_id: MovieId) -> Error {
    Error::not_found(format!("movie {movie_id} does not exist"))
        .with_details(json!({ "code": "movie_not_found", "movieId": movie_id }))
}

fn rating_not_found(movie_id: MovieId) -> Error {
    Error::not_found(format!("movie {movie_id} has not been rated by this user"))
        .with_details(json!({ "code": "rating_not_found", "movieId": movie_id }))
}

impl From<RegisterError> for Error {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::UsernameAlreadyExists { username } => {
                Error::conflict(format!("username {username} is already taken"))
                    .with_details(json!({ "code": "username_taken", "username": username }))
            }
        }
    }
}

impl From<ConfirmUserError> for Error {
    fn from(err: ConfirmUserError) -> Self {
        match err {
            ConfirmUserError::UserDoesNotExist { user_id } => user_not_found(user_id),
            ConfirmUserError::UserAlreadyConfirmed { user_id } => {
                Error::conflict("user is already confirmed").with_details(json!({
                    "code": "user_already_confirmed",
                    "userId": user_id,
                }))
            }
        }
    }
}

impl From<RateMovieError> for Error {
    fn from(err: RateMovieError) -> Self {
        match err {
            RateMovieError::UserDoesNotExist { user_id } => user_not_found(user_id),
            RateMovieError::MovieDoesNotExist { movie_id } => movie_not_found(movie_id),
            RateMovieError::UserMovieRatingAlreadyExists { movie_id } => {
                Error::conflict(format!("movie {movie_id} is already rated by this user"))
                    .with_details(json!({
                        "code": "rating_already_exists",
                        "movieId": movie_id,
                    }))
            }
        }
    }
}

impl From<ReevaluateMovieError> for Error {
    fn from(err: ReevaluateMovieError) -> Self {
        match err {
            ReevaluateMovieError::UserDoesNotExist { user_id } => user_not_found(user_id),
            ReevaluateMovieError::MovieDoesNotExist { movie_id } => movie_not_found(movie_id),
            ReevaluateMovieError::UserMovieRatingDoesNotExist { movie_id } => {
                rating_not_found(movie_id)
            }
        }
    }
}

impl From<RemoveUserMovieRatingError> for Error {
    fn from(err: RemoveUserMovieRatingError) -> Self {
        match err {
            RemoveUserMovieRatingError::UserDoesNotExist { user_id } => user_not_found(user_id),
            RemoveUserMovieRatingError::MovieDoesNotExist { movie_id } => {
                movie_not_found(movie_id)
            }
            RemoveUserMovieRatingError::UserMovieRatingDoesNotExist { movie_id } => {
                rating_not_found(movie_id)
            }
        }
    }
}

impl From<CreateAddingTaskError> for Error {
    fn from(err: CreateAddingTaskError) -> Self {
        match err {
            CreateAddingTaskError::UserDoesNotExist { user_id } => user_not_found(user_id),
        }
    }
}

impl From<LoginError> for Error {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidCredentials => Error::unauthorized("invalid credentials")
                .with_details(json!({ "code": "invalid_credentials" })),
        }
    }
}

impl From<GetCurrentUserError> for Error {
    fn from(err: GetCurrentUserError) -> Self {
        match err {
            GetCurrentUserError::UserDoesNotExist { user_id } => user_not_found(user_id),
        }
    }
}

impl From<GetMovieError> for Error {
    fn from(err: GetMovieError) -> Self {
        match err {
            GetMovieError::MovieDoesNotExist { movie_id } => movie_not_found(movie_id),
        }
    }
}

/// `400` payload naming the field that failed validation.
pub(crate) fn invalid_field(field: &str, code: &str, err: impl std::fmt::Display) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}
