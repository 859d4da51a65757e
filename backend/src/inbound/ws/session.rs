//! Per-connection bot session.
//!
//! Owns framing and heartbeats; every text frame is handed to the connection's
//! [`BotConversation`]. The server pings every 5s and drops a client after 10s
//! without traffic. Tests shorten both intervals.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::{debug, warn};

use crate::domain::TraceId;
use crate::inbound::bot::BotConversation;
use crate::inbound::ws::messages::{BotRequest, BotResponse};

#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_bot_session(
    conversation: BotConversation,
    session: Session,
    stream: MessageStream,
) {
    BotSession::new(conversation).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    Network(Closed),
}

struct BotSession {
    conversation: BotConversation,
}

impl BotSession {
    fn new(conversation: BotConversation) -> Self {
        Self { conversation }
    }

    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    heartbeat_tick(&mut session, last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
            };

            if let Err(error) = result {
                log_shutdown_reason(&error);
                if let Some(reason) = close_reason_for(error) {
                    if let Err(close_error) = session.close(reason).await {
                        warn!(error = %close_error, "failed to close bot session");
                    }
                }
                return;
            }
        }
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let message = match message {
            None => return Err(SessionError::StreamClosed),
            Some(Err(error)) => return Err(SessionError::Protocol(error)),
            Some(Ok(message)) => message,
        };
        *last_heartbeat = Instant::now();

        match message {
            Message::Ping(payload) => session.pong(&payload).await.map_err(SessionError::Network),
            Message::Text(text) => self.handle_text(session, text.as_ref()).await,
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text(&mut self, session: &mut Session, text: &str) -> Result<(), SessionError> {
        let request = serde_json::from_str::<BotRequest>(text).map_err(|error| {
            warn!(error = %error, "rejected malformed bot frame");
            SessionError::InvalidPayload
        })?;

        let trace_id = TraceId::from_uuid(request.trace_id);
        let reply = TraceId::scope(trace_id, self.conversation.respond(&request.text)).await;
        debug!(trace_id = %request.trace_id, "bot reply ready");

        let frame = BotResponse {
            trace_id: request.trace_id,
            reply,
        };
        match serde_json::to_string(&frame) {
            Ok(body) => session.text(body).await.map_err(SessionError::Network),
            Err(error) => {
                warn!(error = %error, "failed to serialise bot reply");
                Ok(())
            }
        }
    }
}

async fn heartbeat_tick(
    session: &mut Session,
    last_heartbeat: Instant,
) -> Result<(), SessionError> {
    if Instant::now().duration_since(last_heartbeat) > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }
    session.ping(b"").await.map_err(SessionError::Network)
}

fn log_shutdown_reason(error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => warn!("bot heartbeat timeout; closing connection"),
        SessionError::Protocol(error) => warn!(error = %error, "bot protocol error"),
        SessionError::Network(error) => warn!(error = %error, "bot send failed"),
        SessionError::InvalidPayload
        | SessionError::ClientClosed(_)
        | SessionError::StreamClosed => {}
    }
}

/// Close frame to send, if the connection is still writable.
fn close_reason_for(error: SessionError) -> Option<Option<CloseReason>> {
    let reason = |code, description: &str| {
        Some(Some(CloseReason {
            code,
            description: Some(description.to_owned()),
        }))
    };
    match error {
        SessionError::HeartbeatTimeout => reason(CloseCode::Normal, "heartbeat timeout"),
        SessionError::Protocol(_) => reason(CloseCode::Protocol, "protocol error"),
        SessionError::InvalidPayload => reason(CloseCode::Policy, "invalid payload"),
        SessionError::ClientClosed(reason) => Some(reason),
        SessionError::StreamClosed | SessionError::Network(_) => None,
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
