//! Reply texts for use-case rejections.
//!
//! Each rejection enum is matched exhaustively, so a new variant does not
//! compile until it has its own reply.

use std::convert::Infallible;

use crate::domain::HandlerError;
use crate::domain::commands::{
    ConfirmUserError, CreateAddingTaskError, RateMovieError, ReevaluateMovieError, RegisterError,
    RemoveUserMovieRatingError,
};
use crate::domain::ports::GatewayError;
use crate::domain::queries::{GetCurrentUserError, GetMovieError, LoginError};

pub(crate) const LOGIN_REQUIRED: &str = "Log in first with /login <username> <password>.";
pub(crate) const ACCOUNT_GONE: &str =
    "Your account no longer exists. Register again with /register.";
const STORAGE_DOWN: &str = "The catalogue is temporarily unavailable. Please try again shortly.";
const INTERNAL: &str = "Something went wrong on our side. Please try again later.";

/// Text shown to a chat user for a rejected use case.
pub trait RejectionReply {
    fn reply(&self) -> String;
}

/// Reply for any handler failure. Faults never expose their cause.
pub fn failure_reply<E: RejectionReply>(err: &HandlerError<E>) -> String {
    match err {
        HandlerError::Rejected(rejection) => rejection.reply(),
        HandlerError::Unexpected(GatewayError::Connection { .. }) => STORAGE_DOWN.to_owned(),
        HandlerError::Unexpected(_) => INTERNAL.to_owned(),
    }
}

impl RejectionReply for Infallible {
    fn reply(&self) -> String {
        match *self {}
    }
}

fn movie_missing(movie_id: impl std::fmt::Display) -> String {
    format!("There is no movie with id {movie_id}.")
}

fn rating_missing(movie_id: impl std::fmt::Display) -> String {
    format!("You have not rated movie {movie_id}. Use /rate first.")
}

impl RejectionReply for RegisterError {
    fn reply(&self) -> String {
        match self {
            Self::UsernameAlreadyExists { username } => {
                format!("The username {username} is already taken. Pick another one.")
            }
        }
    }
}

impl RejectionReply for ConfirmUserError {
    fn reply(&self) -> String {
        match self {
            Self::UserDoesNotExist { .. } => ACCOUNT_GONE.to_owned(),
            Self::UserAlreadyConfirmed { .. } => "Your account is already confirmed.".to_owned(),
        }
    }
}

impl RejectionReply for RateMovieError {
    fn reply(&self) -> String {
        match self {
            Self::UserDoesNotExist { .. } => ACCOUNT_GONE.to_owned(),
            Self::MovieDoesNotExist { movie_id } => movie_missing(movie_id),
            Self::UserMovieRatingAlreadyExists { movie_id } => {
                format!("You already rated movie {movie_id}. Use /rerate to change it.")
            }
        }
    }
}

impl RejectionReply for ReevaluateMovieError {
    fn reply(&self) -> String {
        match self {
            Self::UserDoesNotExist { .. } => ACCOUNT_GONE.to_owned(),
            Self::MovieDoesNotExist { movie_id } => movie_missing(movie_id),
            Self::UserMovieRatingDoesNotExist { movie_id } => rating_missing(movie_id),
        }
    }
}

impl RejectionReply for RemoveUserMovieRatingError {
    fn reply(&self) -> String {
        match self {
            Self::UserDoesNotExist { .. } => ACCOUNT_GONE.to_owned(),
            Self::MovieDoesNotExist { movie_id } => movie_missing(movie_id),
            Self::UserMovieRatingDoesNotExist { movie_id } => {
                format!("There is no rating of yours on movie {movie_id} to remove.")
            }
        }
    }
}

impl RejectionReply for CreateAddingTaskError {
    fn reply(&self) -> String {
        match self {
            Self::UserDoesNotExist { .. } => ACCOUNT_GONE.to_owned(),
        }
    }
}

impl RejectionReply for LoginError {
    fn reply(&self) -> String {
        match self {
            Self::InvalidCredentials => "Wrong username or password.".to_owned(),
        }
    }
}

impl RejectionReply for GetCurrentUserError {
    fn reply(&self) -> String {
        match self {
            Self::UserDoesNotExist { .. } => ACCOUNT_GONE.to_owned(),
        }
    }
}

impl RejectionReply for GetMovieError {
    fn reply(&self) -> String {
        match self {
            Self::MovieDoesNotExist { movie_id } => movie_missing(movie_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;
    use crate::domain::{MovieId, UserId, Username};

    fn movie_id() -> MovieId {
        MovieId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id")
    }

    #[test]
    fn rating_rejections_are_distinct() {
        let movie_id = movie_id();
        let user_id = UserId::random();
        let replies = [
            RateMovieError::UserDoesNotExist { user_id }.reply(),
            RateMovieError::MovieDoesNotExist { movie_id }.reply(),
            RateMovieError::UserMovieRatingAlreadyExists { movie_id }.reply(),
            ReevaluateMovieError::UserMovieRatingDoesNotExist { movie_id }.reply(),
            RemoveUserMovieRatingError::UserMovieRatingDoesNotExist { movie_id }.reply(),
        ];
        let unique: HashSet<&String> = replies.iter().collect();
        assert_eq!(unique.len(), replies.len());
    }

    #[test]
    fn username_taken_names_the_username() {
        let username = Username::new("alice").expect("username");
        let reply = RegisterError::UsernameAlreadyExists { username }.reply();
        assert!(reply.contains("alice"));
    }

    #[rstest]
    #[case(GatewayError::connection("refused"), STORAGE_DOWN)]
    #[case(GatewayError::query("syntax"), INTERNAL)]
    fn faults_hide_their_cause(#[case] fault: GatewayError, #[case] expected: &str) {
        let err: HandlerError<LoginError> = HandlerError::Unexpected(fault);
        assert_eq!(failure_reply(&err), expected);
    }

    #[test]
    fn rejections_use_their_own_reply() {
        let err = HandlerError::Rejected(LoginError::InvalidCredentials);
        assert_eq!(failure_reply(&err), "Wrong username or password.");
    }
}
