//! Telegram webhook that answers exam questions.
//!
//! Text questions go straight to the completion model; photos are fetched
//! from Telegram, run through text recognition and then answered the same
//! way. Replies are split to fit Telegram's message length limit.

mod bot;
pub mod commands;
pub mod completion;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
mod http;
pub mod ocr;
pub mod prompt;
pub mod scratch;
pub mod server;
pub mod telegram;

pub use bot::BotContext;
pub use config::Config;
pub use error::{Error, Result};
pub use http::USER_AGENT;
