//! HTTP rendering of domain errors.
//!
//! Every failure leaves the API as the JSON [`Error`] envelope with the
//! matching status and a `trace-id` header. Internal errors are redacted.
//! Extractor failures (malformed bodies or query strings) are folded into
//! `invalid_request` through [`json_config`] and [`query_config`].

use std::fmt::Display;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if !matches!(error.code(), ErrorCode::InternalError) {
        return error.clone();
    }
    let redacted = Error::internal("Internal server error");
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

/// JSON body limits and error rendering for `web::Json` extractors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err: JsonPayloadError, _req| invalid_input("body", err))
}

/// Error rendering for `web::Query` extractors.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err: QueryPayloadError, _req| invalid_input("query", err))
}

fn invalid_input(location: &'static str, reason: impl Display) -> actix_web::Error {
    let reason = reason.to_string();
    debug!(location, %reason, "rejecting malformed request");
    Error::invalid_request(format!("malformed request {location}"))
        .with_details(json!({ "location": location, "reason": reason }))
        .into()
}
