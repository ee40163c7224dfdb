//! Telegram Bot API adapters.
//!
//! - `TelegramBotApi` / `TelegramBotApiFactory` - reqwest client, one per bot token
//! - `MockBotApi` / `MockBotApiFactory` - in-memory double for tests

mod client;
mod mock_bot_api;

pub use client::{TelegramBotApi, TelegramBotApiFactory};
pub use mock_bot_api::{BotCall, MockBotApi, MockBotApiFactory, OutgoingText};
