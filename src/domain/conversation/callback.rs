//! Opaque data carried by inline keyboard buttons.
//!
//! The purchase flow keeps no server-side session: everything the next
//! step needs travels in the button's callback data.

const GET_STARTED: &str = "get_started";
const MAYBE_LATER: &str = "maybe_later";
const PRICE_PREFIX: &str = "price_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    GetStarted,
    MaybeLater,
    PriceSelected(String),
    Unknown(String),
}

impl CallbackAction {
    pub fn decode(data: &str) -> Self {
        match data {
            GET_STARTED => CallbackAction::GetStarted,
            MAYBE_LATER => CallbackAction::MaybeLater,
            _ => match data.strip_prefix(PRICE_PREFIX) {
                Some(price_id) if !price_id.is_empty() => {
                    CallbackAction::PriceSelected(price_id.to_string())
                }
                _ => CallbackAction::Unknown(data.to_string()),
            },
        }
    }

    pub fn encode(&self) -> String {
        match self {
            CallbackAction::GetStarted => GET_STARTED.to_string(),
            CallbackAction::MaybeLater => MAYBE_LATER.to_string(),
            CallbackAction::PriceSelected(price_id) => format!("{}{}", PRICE_PREFIX, price_id),
            CallbackAction::Unknown(data) => data.clone(),
        }
    }
}
