//! Mock payment gateway for isolating services in tests.

use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;

use crate::billing::{
    GatewayAccount, GatewayAccountLink, GatewayCustomer, GatewayInvoice, GatewayPaymentIntent,
    GatewayResult, GatewaySubscription, InvoiceLine, PaymentGateway,
};
use crate::domain::subscription::PlanType;

mock! {
    pub Gateway {}

    impl PaymentGateway for Gateway {
        async fn create_customer(&self, email: &str, name: &str) -> GatewayResult<GatewayCustomer>;
        async fn create_subscription(
            &self,
            customer_id: &str,
            plan: PlanType,
        ) -> GatewayResult<GatewaySubscription>;
        async fn cancel_subscription(
            &self,
            subscription_id: &str,
            at_period_end: bool,
        ) -> GatewayResult<GatewaySubscription>;
        async fn resume_subscription(
            &self,
            subscription_id: &str,
        ) -> GatewayResult<GatewaySubscription>;
        async fn extend_trial(
            &self,
            subscription_id: &str,
            until: NaiveDateTime,
        ) -> GatewayResult<GatewaySubscription>;
        async fn create_invoice(
            &self,
            customer_id: &str,
            lines: &[InvoiceLine],
            due_date: Option<NaiveDate>,
        ) -> GatewayResult<GatewayInvoice>;
        async fn finalize_invoice(&self, invoice_id: &str) -> GatewayResult<GatewayInvoice>;
        async fn create_payment_intent(
            &self,
            customer_id: &str,
            amount_cents: i64,
            deposit_account_id: &str,
            description: &str,
        ) -> GatewayResult<GatewayPaymentIntent>;
        async fn cancel_payment_intent(&self, intent_id: &str) -> GatewayResult<()>;
        async fn create_deposit_account(&self, email: &str) -> GatewayResult<GatewayAccount>;
        async fn create_onboarding_link(
            &self,
            account_id: &str,
            refresh_url: &str,
            return_url: &str,
        ) -> GatewayResult<GatewayAccountLink>;
        async fn retrieve_deposit_account(&self, account_id: &str) -> GatewayResult<GatewayAccount>;
    }
}
