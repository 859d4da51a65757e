//! Chat bot front end.
//!
//! Transport-agnostic: [`BotConversation`] turns one text message into one
//! reply. The WebSocket adapter in [`crate::inbound::ws`] owns framing and
//! keeps one conversation per connection.

pub mod command;
mod conversation;
pub mod replies;

pub use command::{BotCommand, HELP_TEXT, ParseError};
pub use conversation::BotConversation;
