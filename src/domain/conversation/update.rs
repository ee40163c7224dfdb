//! Inbound Telegram updates, reduced to what the bot reacts to.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::ChatId;

use super::callback::CallbackAction;
use super::command::BotCommand;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

impl User {
    /// `@username - First Last`, `@username`, `First Last`, or `User`.
    pub fn account_description(&self) -> String {
        let full_name = [Some(self.first_name.as_str()), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        match (self.username.as_deref(), full_name.is_empty()) {
            (Some(username), true) => format!("@{}", username),
            (Some(username), false) => format!("@{} - {}", username, full_name),
            (None, false) => full_name,
            (None, true) => "User".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

/// What an update asks the bot to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Command {
        command: BotCommand,
        chat_id: ChatId,
        user: User,
    },
    Callback {
        query_id: String,
        action: CallbackAction,
        chat_id: ChatId,
        user: User,
    },
    /// Well-formed but nothing to do (plain text, stickers, unknown commands).
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("callback query has no message to answer in")]
    NoMessage,

    #[error("update is missing the sender")]
    MissingUser,
}

impl Update {
    /// Reduces the update to the sender, the chat to answer in, and the intent.
    ///
    /// Update kinds other than messages and callback queries are ignored.
    pub fn classify(&self) -> Result<Inbound, UpdateError> {
        if let Some(message) = &self.message {
            let user = message.from.clone().ok_or(UpdateError::MissingUser)?;
            let chat_id = ChatId::new(message.chat.id);
            return Ok(match message.text.as_deref().and_then(BotCommand::parse) {
                Some(command) => Inbound::Command {
                    command,
                    chat_id,
                    user,
                },
                None => Inbound::Ignored,
            });
        }

        if let Some(query) = &self.callback_query {
            let message = query.message.as_ref().ok_or(UpdateError::NoMessage)?;
            return Ok(Inbound::Callback {
                query_id: query.id.clone(),
                action: CallbackAction::decode(query.data.as_deref().unwrap_or_default()),
                chat_id: ChatId::new(message.chat.id),
                user: query.from.clone(),
            });
        }

        Ok(Inbound::Ignored)
    }

    /// `language_code` of whoever sent the update.
    pub fn language_code(&self) -> Option<&str> {
        let sender = match (&self.message, &self.callback_query) {
            (Some(message), _) => message.from.as_ref(),
            (None, Some(query)) => Some(&query.from),
            (None, None) => None,
        };
        sender.and_then(|user| user.language_code.as_deref())
    }
}
