//! Telegram front-end: bot setup, outbound messaging and the handler tree

pub mod bot;
pub mod handlers;
pub mod messenger;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError, RequestHandler, RequestOutcome};
pub use messenger::Messenger;
