//! Handler contract shared by every command and query.
//!
//! A handler takes one input value and answers with a [`HandlerResult`]. The
//! error slot separates the use case's closed rejection union from
//! infrastructure faults, so expected outcomes never travel the same path as
//! broken connections.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use tracing::{debug, error, info};

use super::TraceId;
use super::ports::GatewayError;

/// Failure produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError<E> {
    /// An expected, typed outcome the caller can act upon.
    #[error(transparent)]
    Rejected(E),
    /// A gateway fault. Handlers never recover from these.
    #[error("unexpected failure: {0}")]
    Unexpected(#[from] GatewayError),
}

impl<E> HandlerError<E> {
    /// Returns the rejection, if this is one.
    pub fn rejection(&self) -> Option<&E> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Unexpected(_) => None,
        }
    }
}

/// Uniform return shape of every handler.
pub type HandlerResult<T, E> = Result<T, HandlerError<E>>;

/// A single use case.
#[async_trait]
pub trait Handler: Send + Sync {
    type Input: Send;
    type Output;
    type Rejection;

    async fn handle(&self, input: Self::Input) -> HandlerResult<Self::Output, Self::Rejection>;
}

/// Await `fut`, logging its outcome under `operation`.
///
/// Unexpected faults are logged at error level together with the trace id in
/// scope; rejections at info level. The result is returned unchanged.
pub async fn log_unexpected<T, E, Fut>(operation: &'static str, fut: Fut) -> HandlerResult<T, E>
where
    Fut: Future<Output = HandlerResult<T, E>>,
    E: fmt::Display,
{
    let result = fut.await;
    match &result {
        Ok(_) => debug!(operation, "use case completed"),
        Err(HandlerError::Rejected(rejection)) => {
            info!(operation, %rejection, "use case rejected");
        }
        Err(HandlerError::Unexpected(fault)) => {
            let trace_id = TraceId::current().map(|id| id.to_string());
            error!(operation, trace_id = ?trace_id, error = %fault, "use case failed unexpectedly");
        }
    }
    result
}
