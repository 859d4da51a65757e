//! Inbound adapters that translate external requests into use-case calls
//! while keeping framework details at the edge.
//!
//! - [`http`]: the REST API.
//! - [`bot`]: chat command parsing and replies.
//! - [`ws`]: the WebSocket transport carrying the bot.

pub mod bot;
pub mod http;
pub mod ws;
