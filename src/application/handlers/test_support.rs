//! Fixtures shared by handler tests.

use secrecy::SecretString;

use crate::domain::billing::{
    Customer, Expandable, List, Metadata, Price, PriceRef, Recurring, Subscription,
    SubscriptionItem, SubscriptionState,
};
use crate::domain::conversation::User;
use crate::domain::integration::{
    BotIntegration, IntegrationSettings, Locale, PriceIds, RoutingSecret,
};

pub const CHANNEL_ID: &str = "-1001234567890";

pub fn tenant(prices: &[&str]) -> BotIntegration {
    BotIntegration::new(
        IntegrationSettings {
            name: "Premium Signals".to_string(),
            bot_token: SecretString::new("123456:ABC-DEF".to_string()),
            bot_username: Some("signals_bot".to_string()),
            channel_id: CHANNEL_ID.to_string(),
            price_ids: PriceIds::from(prices.iter().map(|p| p.to_string()).collect::<Vec<_>>()),
            default_locale: Locale::En,
            offer_text: "<b>Premium Signals</b>\nDaily trade ideas.".to_string(),
            active: true,
        },
        RoutingSecret::generate(),
    )
}

pub fn price(id: &str, amount: i64, interval: Option<&str>) -> Price {
    Price {
        id: id.to_string(),
        active: true,
        currency: "usd".to_string(),
        unit_amount: Some(amount),
        recurring: interval.map(|interval| Recurring {
            interval: interval.to_string(),
            interval_count: 1,
        }),
    }
}

pub fn metadata(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn customer(id: &str, pairs: &[(&str, &str)]) -> Customer {
    Customer {
        id: id.to_string(),
        metadata: metadata(pairs),
    }
}

pub fn subscription(
    id: &str,
    customer_id: &str,
    status: SubscriptionState,
    created: i64,
) -> Subscription {
    Subscription {
        id: id.to_string(),
        status,
        customer: Expandable::Id(customer_id.to_string()),
        cancel_at_period_end: false,
        current_period_end: Some(created + 30 * 24 * 60 * 60),
        cancel_at: None,
        ended_at: None,
        created,
        metadata: Metadata::new(),
        items: List {
            data: vec![SubscriptionItem {
                price: PriceRef {
                    id: "price_monthly".to_string(),
                },
            }],
        },
    }
}

pub fn user(id: i64) -> User {
    User {
        id,
        is_bot: false,
        first_name: "Olena".to_string(),
        last_name: Some("Kovalenko".to_string()),
        username: Some("olena_k".to_string()),
        language_code: Some("en".to_string()),
    }
}
