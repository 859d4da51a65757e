//! Query handlers: read-only use cases.

mod check_username_existence;
mod get_current_user;
mod get_movie;
mod login;

pub use check_username_existence::{
    CheckUsernameExistenceGateway, CheckUsernameExistenceHandler, CheckUsernameExistenceQuery,
};
pub use get_current_user::{
    CurrentUser, GetCurrentUserError, GetCurrentUserGateway, GetCurrentUserHandler,
    GetCurrentUserQuery,
};
pub use get_movie::{GetMovieError, GetMovieGateway, GetMovieHandler, GetMovieQuery, MovieDetails};
pub use login::{LoginError, LoginGateway, LoginHandler, LoginQuery};
