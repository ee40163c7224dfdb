//! Slash commands understood by every bot.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Status,
    Cancel,
}

impl BotCommand {
    pub const ALL: [BotCommand; 3] = [BotCommand::Start, BotCommand::Status, BotCommand::Cancel];

    /// Matches the first word of a message, ignoring an `@botname` suffix.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split_once('@').map_or(name, |(name, _)| name);
        match name {
            "start" => Some(BotCommand::Start),
            "status" => Some(BotCommand::Status),
            "cancel" => Some(BotCommand::Cancel),
            _ => None,
        }
    }

    /// Name as registered with `setMyCommands`.
    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Start => "start",
            BotCommand::Status => "status",
            BotCommand::Cancel => "cancel",
        }
    }
}
