//! Telegram bot handler tree configuration
//!
//! The schema only routes updates; the work happens in [`RequestHandler`],
//! which talks to Telegram through the [`Messenger`](crate::telegram::Messenger)
//! trait so it can be driven from tests without a bot.

mod commands;
pub mod request;
mod schema;
mod types;

pub use commands::handle_command;
pub use request::{RequestHandler, RequestOutcome};
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
