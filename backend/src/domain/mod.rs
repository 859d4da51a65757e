//! Domain entities, use case handlers and ports.
//!
//! Purpose: hold every business rule of the catalogue. Entities enforce their
//! own invariants; handlers orchestrate one use case each against narrow
//! gateway capabilities declared in [`ports`].
//!
//! Public surface:
//! - Entities: [`User`], [`Movie`], [`UserMovieRating`], [`AddingTask`].
//! - Handler contract: [`Handler`], [`HandlerError`], [`HandlerResult`].
//! - Use cases: [`commands`] and [`queries`], dispatched by
//!   [`HandlerInteractor`].
//! - Transport payload: [`Error`] and [`ErrorCode`].

pub mod adding_task;
pub mod auth;
pub mod commands;
pub mod error;
pub mod handler;
pub mod interactor;
pub mod movie;
pub mod ports;
pub mod queries;
pub mod rating;
pub mod trace_id;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::adding_task::{
    AddingTask, AddingTaskCreatedEvent, AddingTaskId, AddingTaskStatus, AddingTaskType,
    AddingTaskValidationError, KinopoiskId,
};
pub use self::auth::{Credentials, CredentialsValidationError, Password};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::handler::{Handler, HandlerError, HandlerResult, log_unexpected};
pub use self::interactor::HandlerInteractor;
pub use self::movie::{
    MOVIE_TITLE_MAX, Movie, MovieId, MovieSnapshot, MovieTitle, MovieValidationError,
    RatingAggregateUnderflow,
};
pub use self::rating::{RATING_MAX, RatingOutOfRange, RatingValue, UserMovieRating};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    PasswordHash, USERNAME_MAX, User, UserAlreadyConfirmed, UserId, UserSnapshot,
    UserValidationError, Username,
};
