//! PlanCatalog - the prices a tenant can sell right now.

use std::sync::Arc;

use futures::future::join_all;

use crate::domain::billing::Price;
use crate::domain::integration::BotIntegration;
use crate::ports::PaymentProvider;

#[derive(Clone)]
pub struct PlanCatalog {
    payments: Arc<dyn PaymentProvider>,
}

impl PlanCatalog {
    pub fn new(payments: Arc<dyn PaymentProvider>) -> Self {
        Self { payments }
    }

    /// Looks up every configured price independently and keeps the active
    /// ones, in the tenant's configured order.
    pub async fn fetch_sellable_plans(&self, integration: &BotIntegration) -> Vec<Price> {
        let lookups = integration
            .price_ids
            .as_slice()
            .iter()
            .map(|price_id| self.payments.retrieve_price(price_id));

        let results = join_all(lookups).await;

        integration
            .price_ids
            .as_slice()
            .iter()
            .zip(results)
            .filter_map(|(price_id, result)| match result {
                Ok(price) if price.active => Some(price),
                Ok(_) => {
                    tracing::warn!(
                        integration_id = %integration.id,
                        price_id = %price_id,
                        "Skipping archived price"
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!(
                        integration_id = %integration.id,
                        price_id = %price_id,
                        error = %e,
                        "Skipping unavailable price"
                    );
                    None
                }
            })
            .collect()
    }
}
