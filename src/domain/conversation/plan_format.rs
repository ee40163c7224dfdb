//! Rendering of a Stripe price as a plan button label.

use crate::domain::billing::Price;

/// Billing cadence of a price, before localization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanInterval {
    Monthly,
    Yearly,
    /// Recurring with an interval that has no dedicated wording (`week`, `day`).
    Other(String),
    OneTime,
}

impl PlanInterval {
    pub fn of(price: &Price) -> Self {
        match price.recurring.as_ref().map(|r| r.interval.as_str()) {
            None => PlanInterval::OneTime,
            Some("month") => PlanInterval::Monthly,
            Some("year") => PlanInterval::Yearly,
            Some(other) => PlanInterval::Other(other.to_string()),
        }
    }
}

pub fn currency_symbol(currency: &str) -> String {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "UAH" => "₴".to_string(),
        "RUB" => "₽".to_string(),
        other => other.to_string(),
    }
}

/// Minor units to a two-decimal string.
pub fn format_amount(unit_amount: i64) -> String {
    let sign = if unit_amount < 0 { "-" } else { "" };
    let abs = unit_amount.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// `<symbol><amount> - <interval>`, e.g. `$5.00 - monthly`.
pub fn plan_label(price: &Price, interval_text: &str) -> String {
    format!(
        "{}{} - {}",
        currency_symbol(&price.currency),
        format_amount(price.unit_amount.unwrap_or(0)),
        interval_text
    )
}
