//! Conversation handlers.

mod handle_update;

pub use handle_update::{ConversationRouter, HandleUpdateCommand, HandleUpdateResult};
