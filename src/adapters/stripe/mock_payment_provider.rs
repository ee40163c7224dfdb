//! Mock payment provider for testing.
//!
//! Provides a configurable in-memory implementation of `PaymentProvider` for
//! unit and integration tests. Supports:
//! - Seeded prices, customers, subscriptions and checkout line items
//! - Error injection, per method or for the next call
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::billing::{
    BillingPortalSession, CheckoutLineItem, CheckoutSession, Customer, Metadata, Price,
    Subscription,
};
use crate::ports::{CreateCheckoutRequest, PaymentError, PaymentProvider};

/// Mock payment provider for testing.
///
/// Clones share state, so a test can keep one handle for assertions and
/// give another to the code under test.
///
/// # Example
///
/// ```ignore
/// let stripe = MockPaymentProvider::new();
/// stripe.add_price(price("price_monthly", 500, Some("month")));
/// stripe.set_method_error("retrieve_price", PaymentError::network("timeout"));
/// assert_eq!(stripe.call_count("create_checkout_session"), 1);
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    prices: HashMap<String, Price>,
    /// Insertion order is the "search" order.
    customers: Vec<Customer>,
    subscriptions: Vec<Subscription>,
    line_items: HashMap<String, Vec<CheckoutLineItem>>,
    checkout_requests: Vec<CreateCheckoutRequest>,
    next_error: Option<PaymentError>,
    method_errors: HashMap<String, PaymentError>,
    call_log: Vec<MethodCall>,
    sequence: u64,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    pub fn add_price(&self, price: Price) {
        self.state().prices.insert(price.id.clone(), price);
    }

    pub fn add_customer(&self, customer: Customer) {
        self.state().customers.push(customer);
    }

    pub fn add_subscription(&self, subscription: Subscription) {
        let mut state = self.state();
        state.subscriptions.retain(|s| s.id != subscription.id);
        state.subscriptions.push(subscription);
    }

    /// Line items returned for a checkout session.
    pub fn set_line_items(&self, session_id: &str, items: Vec<CheckoutLineItem>) {
        self.state().line_items.insert(session_id.to_string(), items);
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Set an error returned by every call to `method`.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.call_count(method) > 0
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Every checkout request received, in order.
    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.state().checkout_requests.clone()
    }

    /// Customers currently known, including created ones.
    pub fn customers(&self) -> Vec<Customer> {
        self.state().customers.clone()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_call(&self, method: &str, args: Vec<String>) -> Result<(), PaymentError> {
        let mut state = self.state();
        state.call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }
        match state.next_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_id(state: &mut MockState, prefix: &str) -> String {
        state.sequence += 1;
        format!("{}_mock_{}", prefix, state.sequence)
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn retrieve_price(&self, price_id: &str) -> Result<Price, PaymentError> {
        self.record_call("retrieve_price", vec![price_id.to_string()])?;
        self.state()
            .prices
            .get(price_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Price"))
    }

    async fn search_customers_by_metadata(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Vec<Customer>, PaymentError> {
        self.record_call(
            "search_customers_by_metadata",
            vec![key.to_string(), value.to_string()],
        )?;
        Ok(self
            .state()
            .customers
            .iter()
            .filter(|c| c.metadata.get(key).map(String::as_str) == Some(value))
            .cloned()
            .collect())
    }

    async fn retrieve_customer(&self, customer_id: &str) -> Result<Customer, PaymentError> {
        self.record_call("retrieve_customer", vec![customer_id.to_string()])?;
        self.state()
            .customers
            .iter()
            .find(|c| c.id == customer_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Customer"))
    }

    async fn create_customer(&self, metadata: Metadata) -> Result<Customer, PaymentError> {
        self.record_call("create_customer", vec![format!("{:?}", metadata)])?;
        let mut state = self.state();
        let customer = Customer {
            id: Self::next_id(&mut state, "cus"),
            metadata,
        };
        state.customers.push(customer.clone());
        Ok(customer)
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record_call(
            "create_checkout_session",
            vec![request.customer_id.clone(), request.price_id.clone()],
        )?;
        let mut state = self.state();
        let id = Self::next_id(&mut state, "cs");
        let session = CheckoutSession {
            url: Some(format!("https://checkout.stripe.com/c/pay/{}", id)),
            id,
            mode: request.mode,
            payment_status: Some("unpaid".to_string()),
            customer: Some(request.customer_id.clone()),
            metadata: request.metadata.clone(),
        };
        state.checkout_requests.push(request);
        Ok(session)
    }

    async fn list_checkout_line_items(
        &self,
        session_id: &str,
    ) -> Result<Vec<CheckoutLineItem>, PaymentError> {
        self.record_call("list_checkout_line_items", vec![session_id.to_string()])?;
        Ok(self
            .state()
            .line_items
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, PaymentError> {
        self.record_call("retrieve_subscription", vec![subscription_id.to_string()])?;
        self.state()
            .subscriptions
            .iter()
            .find(|s| s.id == subscription_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Subscription"))
    }

    async fn list_subscriptions(
        &self,
        customer_id: &str,
        limit: u32,
    ) -> Result<Vec<Subscription>, PaymentError> {
        self.record_call(
            "list_subscriptions",
            vec![customer_id.to_string(), limit.to_string()],
        )?;
        Ok(self
            .state()
            .subscriptions
            .iter()
            .filter(|s| s.customer.id() == customer_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<BillingPortalSession, PaymentError> {
        self.record_call(
            "create_portal_session",
            vec![customer_id.to_string(), return_url.to_string()],
        )?;
        Ok(BillingPortalSession {
            url: format!("https://billing.stripe.com/p/session/{}", customer_id),
        })
    }
}
