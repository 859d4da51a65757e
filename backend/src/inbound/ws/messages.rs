//! Wire frames for the bot WebSocket.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound chat message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotRequest {
    /// Client-provided correlation identifier.
    pub trace_id: Uuid,
    pub text: String,
}

/// Reply to one [`BotRequest`], echoing its trace id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotResponse {
    pub trace_id: Uuid,
    pub reply: String,
}
