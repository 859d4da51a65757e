//! Parsing of chat commands into validated domain inputs.
//!
//! ```text
//! /rate 3fa85f64-5717-4562-b3fc-2c963f66afa6 8
//! /request series 464963
//! ```
//!
//! Arguments are validated here, so the conversation only ever sees domain
//! values. Every failure carries the text shown to the user.

use crate::domain::{
    AddingTaskType, Credentials, CredentialsValidationError, KinopoiskId, MovieId, MovieTitle,
    MovieValidationError, RatingValue, UserValidationError,
};

/// A recognised and validated chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum BotCommand {
    Help,
    Register(Credentials),
    Login(Credentials),
    Me,
    Confirm,
    Movie(MovieId),
    AddMovie(MovieTitle),
    Rate { movie_id: MovieId, rating: RatingValue },
    Rerate { movie_id: MovieId, rating: RatingValue },
    Unrate(MovieId),
    Request {
        adding_type: AddingTaskType,
        kinopoisk_id: KinopoiskId,
    },
}

/// Why a message could not be turned into a [`BotCommand`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("messages must start with a command such as /help")]
    NotACommand,
    #[error("unknown command {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Invalid(String),
}

const REGISTER_USAGE: &str = "/register <username> <password>";
const LOGIN_USAGE: &str = "/login <username> <password>";
const MOVIE_USAGE: &str = "/movie <movie-id>";
const ADD_MOVIE_USAGE: &str = "/addmovie <title>";
const RATE_USAGE: &str = "/rate <movie-id> <0-10>";
const RERATE_USAGE: &str = "/rerate <movie-id> <0-10>";
const UNRATE_USAGE: &str = "/unrate <movie-id>";
const REQUEST_USAGE: &str = "/request <movie|series> <kinopoisk-id>";

/// Command summary sent for `/start`, `/help` and unknown commands.
pub const HELP_TEXT: &str = "\
Commands:
/register <username> <password> - create an account
/login <username> <password> - log in on this connection
/me - show your profile
/confirm - confirm your account
/movie <movie-id> - show a movie
/addmovie <title> - add a movie
/rate <movie-id> <0-10> - rate a movie
/rerate <movie-id> <0-10> - change your rating
/unrate <movie-id> - remove your rating
/request <movie|series> <kinopoisk-id> - ask for a title to be imported";

impl BotCommand {
    /// Parse one chat message.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        let Some(rest) = text.strip_prefix('/') else {
            return Err(ParseError::NotACommand);
        };
        let (head, args) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(head, args)| (head, args.trim()));
        // `/rate@cinerate_bot` addresses a specific bot in group chats.
        let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();

        match name.as_str() {
            "start" | "help" => Ok(Self::Help),
            "register" => credentials(args, REGISTER_USAGE).map(Self::Register),
            "login" => credentials(args, LOGIN_USAGE).map(Self::Login),
            "me" => no_args(args, "/me").map(|()| Self::Me),
            "confirm" => no_args(args, "/confirm").map(|()| Self::Confirm),
            "movie" => {
                let [raw_id] = exact_args(args, MOVIE_USAGE)?;
                movie_id(raw_id).map(Self::Movie)
            }
            "addmovie" => {
                if args.is_empty() {
                    return Err(ParseError::Usage(ADD_MOVIE_USAGE));
                }
                MovieTitle::new(args)
                    .map(Self::AddMovie)
                    .map_err(title_error)
            }
            "rate" => {
                let (movie_id, rating) = rating_args(args, RATE_USAGE)?;
                Ok(Self::Rate { movie_id, rating })
            }
            "rerate" => {
                let (movie_id, rating) = rating_args(args, RERATE_USAGE)?;
                Ok(Self::Rerate { movie_id, rating })
            }
            "unrate" => {
                let [raw_id] = exact_args(args, UNRATE_USAGE)?;
                movie_id(raw_id).map(Self::Unrate)
            }
            "request" => {
                let [raw_type, raw_id] = exact_args(args, REQUEST_USAGE)?;
                let adding_type = raw_type.parse::<AddingTaskType>().map_err(|_| {
                    ParseError::Invalid(format!(
                        "\"{raw_type}\" is not a title type. Use movie or series."
                    ))
                })?;
                let kinopoisk_id = KinopoiskId::new(raw_id).map_err(|_| {
                    ParseError::Invalid(format!(
                        "\"{raw_id}\" is not a Kinopoisk id. It must contain digits only."
                    ))
                })?;
                Ok(Self::Request {
                    adding_type,
                    kinopoisk_id,
                })
            }
            _ => Err(ParseError::Unknown(format!("/{name}"))),
        }
    }
}

fn exact_args<'a, const N: usize>(
    args: &'a str,
    usage: &'static str,
) -> Result<[&'a str; N], ParseError> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    parts.try_into().map_err(|_| ParseError::Usage(usage))
}

fn no_args(args: &str, usage: &'static str) -> Result<(), ParseError> {
    exact_args::<0>(args, usage).map(|[]| ())
}

fn credentials(args: &str, usage: &'static str) -> Result<Credentials, ParseError> {
    let [username, password] = exact_args(args, usage)?;
    Credentials::try_from_parts(username, password).map_err(|err| match err {
        CredentialsValidationError::Username(UserValidationError::UsernameTooLong { max }) => {
            ParseError::Invalid(format!("Usernames are limited to {max} characters."))
        }
        other => ParseError::Invalid(format!("Invalid credentials: {other}.")),
    })
}

fn movie_id(raw: &str) -> Result<MovieId, ParseError> {
    MovieId::new(raw)
        .map_err(|_| ParseError::Invalid(format!("\"{raw}\" is not a valid movie id.")))
}

fn rating_args(args: &str, usage: &'static str) -> Result<(MovieId, RatingValue), ParseError> {
    let [raw_id, raw_rating] = exact_args(args, usage)?;
    let movie_id = movie_id(raw_id)?;
    let rating = raw_rating
        .parse::<i64>()
        .map_err(|_| ParseError::Usage(usage))
        .and_then(|value| {
            RatingValue::try_from(value)
                .map_err(|_| ParseError::Invalid("Ratings go from 0 to 10.".to_owned()))
        })?;
    Ok((movie_id, rating))
}

fn title_error(err: MovieValidationError) -> ParseError {
    match err {
        MovieValidationError::TitleTooLong { max } => {
            ParseError::Invalid(format!("Titles are limited to {max} characters."))
        }
        other => ParseError::Invalid(format!("Invalid title: {other}.")),
    }
}
