//! Payment-processor gateway.
//!
//! Services depend on the [`PaymentGateway`] trait and the normalized types
//! below; the Stripe-backed implementation lives in [`stripe`] and is the
//! only module that touches the vendor SDK.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::domain::mediator::DepositAccountState;
use crate::domain::subscription::{PlanType, SubscriptionStatus};

pub mod events;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod stripe;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("processor API error: {0}")]
    Api(String),

    #[error("invalid processor identifier: {0}")]
    InvalidId(String),

    #[error("webhook signature verification failed")]
    InvalidSignature,

    #[error("unexpected processor payload: {0}")]
    UnexpectedPayload(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCustomer {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySubscription {
    pub id: String,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<NaiveDateTime>,
    pub cancel_at_period_end: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayInvoice {
    pub id: String,
    /// Processor-assigned invoice number, present once finalized.
    pub number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPaymentIntent {
    pub id: String,
    /// Secret handed to the browser to confirm the payment.
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayAccount {
    pub id: String,
    pub state: DepositAccountState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayAccountLink {
    pub url: String,
}

/// One line charged on a processor invoice, in cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLine {
    pub description: String,
    pub amount_cents: i64,
}

/// Processor operations used by the service layer. Implementations must not
/// mutate local state: callers persist only after a call succeeds, so a
/// processor failure leaves local records untouched.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn create_customer(&self, email: &str, name: &str) -> GatewayResult<GatewayCustomer>;

    async fn create_subscription(
        &self,
        customer_id: &str,
        plan: PlanType,
    ) -> GatewayResult<GatewaySubscription>;

    /// Cancels at period end when `at_period_end`, immediately otherwise.
    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> GatewayResult<GatewaySubscription>;

    /// Clears a scheduled cancellation.
    async fn resume_subscription(
        &self,
        subscription_id: &str,
    ) -> GatewayResult<GatewaySubscription>;

    /// Pushes the subscription's trial end out to `until`, used for the
    /// one-time promo period.
    async fn extend_trial(
        &self,
        subscription_id: &str,
        until: NaiveDateTime,
    ) -> GatewayResult<GatewaySubscription>;

    /// Creates a draft invoice with the given lines on the customer.
    async fn create_invoice(
        &self,
        customer_id: &str,
        lines: &[InvoiceLine],
        due_date: Option<NaiveDate>,
    ) -> GatewayResult<GatewayInvoice>;

    /// Finalizes a draft invoice; the processor assigns the number and
    /// emails the customer.
    async fn finalize_invoice(&self, invoice_id: &str) -> GatewayResult<GatewayInvoice>;

    /// Creates a payment intent charging the customer with the funds routed
    /// to the mediator's deposit account.
    async fn create_payment_intent(
        &self,
        customer_id: &str,
        amount_cents: i64,
        deposit_account_id: &str,
        description: &str,
    ) -> GatewayResult<GatewayPaymentIntent>;

    async fn cancel_payment_intent(&self, intent_id: &str) -> GatewayResult<()>;

    /// Creates an express deposit account for the mediator.
    async fn create_deposit_account(&self, email: &str) -> GatewayResult<GatewayAccount>;

    /// Builds a hosted onboarding link for the deposit account.
    async fn create_onboarding_link(
        &self,
        account_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> GatewayResult<GatewayAccountLink>;

    /// Re-reads the account's verification state from the processor.
    async fn retrieve_deposit_account(&self, account_id: &str) -> GatewayResult<GatewayAccount>;
}
