//! Integration domain - bot tenants and their configuration rules.

mod bot_integration;
mod errors;
mod locale;
mod price_ids;
mod routing_secret;

pub use bot_integration::{
    normalize_bot_username, require_non_blank, BotIntegration, IntegrationSettings,
};
pub use errors::IntegrationError;
pub use locale::Locale;
pub use price_ids::{PriceIds, PriceIdsInput};
pub use routing_secret::{RoutingSecret, ROUTING_SECRET_LEN};
