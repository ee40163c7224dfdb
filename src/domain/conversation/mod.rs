//! Conversation domain - the stateless bot dialogue vocabulary.
//!
//! Inbound updates are classified into commands and callbacks; outbound
//! messages carry inline keyboards whose callback data encodes the next step.

mod callback;
mod command;
mod html;
mod keyboard;
mod plan_format;
mod update;

pub use callback::CallbackAction;
pub use command::BotCommand;
pub use html::escape_html;
pub use keyboard::{InlineKeyboardButton, InlineKeyboardMarkup};
pub use plan_format::{currency_symbol, format_amount, plan_label, PlanInterval};
pub use update::{CallbackQuery, Chat, Inbound, Message, Update, UpdateError, User};
