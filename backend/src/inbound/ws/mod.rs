//! WebSocket transport for the chat bot.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list)
//! - start one [`BotConversation`] per connection
//! - keep framing and heartbeats at the edge

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{error, info, warn};
use url::Url;

use crate::inbound::bot::BotConversation;

mod session;

pub mod messages;
pub mod state;

/// Upgrade `/ws/bot` to a bot session.
#[get("/ws/bot")]
pub async fn bot_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        warn!("missing Origin header on bot upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        warn!("multiple Origin headers on bot upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }
    validate_origin(origin_header)?;

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|err| {
        error!(error = %err, "bot upgrade failed");
        actix_web::error::ErrorInternalServerError("WebSocket upgrade failed")
    })?;
    info!("bot connection opened");
    let conversation = BotConversation::new(state.interactor.clone());
    actix_web::rt::spawn(session::handle_bot_session(conversation, session, messages));
    Ok(response)
}

fn validate_origin(origin_header: &HeaderValue) -> actix_web::Result<()> {
    let origin_value = origin_header.to_str().map_err(|err| {
        warn!(error = %err, "Origin header is not valid text");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;
    let origin = Url::parse(origin_value).map_err(|err| {
        warn!(error = %err, "Origin header is not a URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if is_allowed_origin(&origin) {
        Ok(())
    } else {
        warn!(origin = origin_value, "rejected bot upgrade from disallowed Origin");
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

const PRIMARY_HOST: &str = "cinerate.example";
const LOCALHOST: &str = "localhost";
const ALLOWED_SUBDOMAIN_SUFFIX: &str = ".cinerate.example";

/// HTTPS from the production domain or its subdomains, or HTTP from
/// localhost with an explicit non-zero port.
fn is_allowed_origin(origin: &Url) -> bool {
    let Some(host) = origin.host_str() else {
        return false;
    };

    match origin.scheme() {
        "http" if host == LOCALHOST => matches!(origin.port(), Some(port) if port != 0),
        "https" if host == PRIMARY_HOST => true,
        "https" => host.ends_with(ALLOWED_SUBDOMAIN_SUFFIX),
        _ => false,
    }
}
