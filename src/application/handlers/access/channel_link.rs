//! Links that open a tenant's gated channel.

use crate::ports::BotApi;

/// Name shown to channel admins for links minted by the bots.
pub const INVITE_LINK_NAME: &str = "Subscription Access Link";

/// A link to the channel: the public `t.me` link when the channel has a
/// handle, otherwise a freshly minted invite link, otherwise the exported
/// primary link.
///
/// Each step is tried independently; failures are logged and the next
/// step is attempted. `None` when nothing worked.
pub async fn channel_link(bot: &dyn BotApi, channel_id: &str) -> Option<String> {
    if let Some(link) = public_link(bot, channel_id).await {
        return Some(link);
    }

    match bot.create_chat_invite_link(channel_id, INVITE_LINK_NAME).await {
        Ok(invite) => return Some(invite.invite_link),
        Err(e) => tracing::warn!(
            channel_id = %channel_id,
            error = %e,
            "createChatInviteLink failed"
        ),
    }

    match bot.export_chat_invite_link(channel_id).await {
        Ok(link) if !link.trim().is_empty() => Some(link),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(
                channel_id = %channel_id,
                error = %e,
                "exportChatInviteLink failed"
            );
            None
        }
    }
}

async fn public_link(bot: &dyn BotApi, channel_id: &str) -> Option<String> {
    if let Some(handle) = channel_id.strip_prefix('@').filter(|h| !h.is_empty()) {
        return Some(format!("https://t.me/{}", handle));
    }

    match bot.get_chat(channel_id).await {
        Ok(chat) => chat
            .username
            .filter(|u| !u.is_empty())
            .map(|username| format!("https://t.me/{}", username)),
        Err(e) => {
            tracing::debug!(channel_id = %channel_id, error = %e, "getChat failed");
            None
        }
    }
}
