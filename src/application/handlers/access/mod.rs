//! Access handlers.
//!
//! Granting channel membership after payment, and producing channel links.

mod channel_link;
mod grant_channel_access;

pub use channel_link::{channel_link, INVITE_LINK_NAME};
pub use grant_channel_access::{ChannelAccessGranter, GrantError, GrantOutcome};
