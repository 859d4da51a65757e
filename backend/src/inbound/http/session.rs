//! Cookie session access for HTTP handlers.
//!
//! `POST /login` binds the session to a user through [`LoginSession`].
//! Handlers acting on behalf of a user take a [`Caller`], which answers `401`
//! when the cookie carries no valid user id.

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Session handle used by the login endpoint.
pub struct LoginSession(Session);

impl LoginSession {
    /// Rotate the session and bind it to `user_id`.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }
}

impl FromRequest for LoginSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(req.get_session())))
    }
}

/// The authenticated user behind a request.
#[derive(Debug, Clone)]
pub struct Caller(UserId);

impl Caller {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }

    pub fn into_user_id(self) -> UserId {
        self.0
    }
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = req.get_session();
        Box::pin(async move { caller_from_session(&session) })
    }
}

/// A tampered or malformed id purges the session and counts as absent.
fn caller_from_session(session: &Session) -> Result<Caller, Error> {
    let raw = session
        .get::<String>(USER_ID_KEY)
        .map_err(|error| Error::internal(format!("failed to read session: {error}")))?
        .ok_or_else(login_required)?;

    UserId::new(raw).map(Caller).map_err(|error| {
        warn!(%error, "discarding invalid user id in session cookie");
        session.purge();
        login_required()
    })
}

fn login_required() -> Error {
    Error::unauthorized("login required")
}
