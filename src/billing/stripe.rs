//! Stripe-backed implementation of [`PaymentGateway`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use stripe::{
    Account, AccountId, AccountLink, AccountLinkType, AccountType, CancelPaymentIntent,
    CancelSubscription, Client, CollectionMethod, CreateAccount, CreateAccountCapabilities,
    CreateAccountCapabilitiesCardPayments, CreateAccountCapabilitiesTaxReportingUs1099K,
    CreateAccountCapabilitiesTaxReportingUs1099Misc, CreateAccountCapabilitiesTransfers,
    CreateAccountLink, CreateCustomer, CreateInvoice, CreateInvoiceItem, CreatePaymentIntent,
    CreatePaymentIntentTransferData, CreateSubscription, CreateSubscriptionItems, Currency,
    Customer, CustomerId, Invoice, InvoiceId, PaymentIntent, PaymentIntentId, Scheduled,
    Subscription, SubscriptionId, UpdateSubscription,
};

use crate::billing::{
    GatewayAccount, GatewayAccountLink, GatewayCustomer, GatewayError, GatewayInvoice,
    GatewayPaymentIntent, GatewayResult, GatewaySubscription, InvoiceLine, PaymentGateway,
};
use crate::domain::mediator::DepositAccountState;
use crate::domain::subscription::{PlanType, SubscriptionStatus};

/// Processor price ids for the subscription plans.
#[derive(Debug, Clone)]
pub struct PlanPrices {
    pub standard: String,
    pub premium: String,
}

impl PlanPrices {
    fn for_plan(&self, plan: PlanType) -> &str {
        match plan {
            PlanType::Standard => &self.standard,
            PlanType::Premium => &self.premium,
        }
    }
}

#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    prices: PlanPrices,
}

impl StripeGateway {
    pub fn new(secret_key: &str, prices: PlanPrices) -> Self {
        Self {
            client: Client::new(secret_key.to_string()),
            prices,
        }
    }
}

impl From<stripe::StripeError> for GatewayError {
    fn from(err: stripe::StripeError) -> Self {
        GatewayError::Api(err.to_string())
    }
}

impl From<stripe::ParseIdError> for GatewayError {
    fn from(err: stripe::ParseIdError) -> Self {
        GatewayError::InvalidId(err.to_string())
    }
}

pub(crate) fn subscription_status(status: stripe::SubscriptionStatus) -> SubscriptionStatus {
    use stripe::SubscriptionStatus as S;
    match status {
        S::Trialing => SubscriptionStatus::Trialing,
        S::Active => SubscriptionStatus::Active,
        S::PastDue => SubscriptionStatus::PastDue,
        _ => SubscriptionStatus::Canceled,
    }
}

pub(crate) fn naive_from_timestamp(ts: i64) -> Option<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|dt| dt.naive_utc())
}

fn gateway_subscription(sub: Subscription) -> GatewaySubscription {
    GatewaySubscription {
        id: sub.id.to_string(),
        status: subscription_status(sub.status),
        current_period_end: naive_from_timestamp(sub.current_period_end),
        cancel_at_period_end: sub.cancel_at_period_end,
    }
}

fn gateway_account(account: Account) -> GatewayAccount {
    GatewayAccount {
        id: account.id.to_string(),
        state: DepositAccountState {
            charges_enabled: account.charges_enabled.unwrap_or(false),
            payouts_enabled: account.payouts_enabled.unwrap_or(false),
            details_submitted: account.details_submitted.unwrap_or(false),
        },
    }
}

impl PaymentGateway for StripeGateway {
    async fn create_customer(&self, email: &str, name: &str) -> GatewayResult<GatewayCustomer> {
        let params = CreateCustomer {
            email: Some(email),
            name: Some(name),
            ..Default::default()
        };
        let customer = Customer::create(&self.client, params).await?;

        Ok(GatewayCustomer {
            id: customer.id.to_string(),
        })
    }

    async fn create_subscription(
        &self,
        customer_id: &str,
        plan: PlanType,
    ) -> GatewayResult<GatewaySubscription> {
        let customer_id = customer_id.parse::<CustomerId>()?;

        let mut params = CreateSubscription::new(customer_id);
        params.items = Some(vec![CreateSubscriptionItems {
            price: Some(self.prices.for_plan(plan).to_string()),
            quantity: Some(1),
            ..Default::default()
        }]);
        let subscription = Subscription::create(&self.client, params).await?;

        Ok(gateway_subscription(subscription))
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> GatewayResult<GatewaySubscription> {
        let sub_id = subscription_id.parse::<SubscriptionId>()?;

        let subscription = if at_period_end {
            let params = UpdateSubscription {
                cancel_at_period_end: Some(true),
                ..Default::default()
            };
            Subscription::update(&self.client, &sub_id, params).await?
        } else {
            let params = CancelSubscription {
                cancellation_details: None,
                invoice_now: None,
                prorate: None,
            };
            Subscription::cancel(&self.client, &sub_id, params).await?
        };

        Ok(gateway_subscription(subscription))
    }

    async fn resume_subscription(
        &self,
        subscription_id: &str,
    ) -> GatewayResult<GatewaySubscription> {
        let sub_id = subscription_id.parse::<SubscriptionId>()?;
        let params = UpdateSubscription {
            cancel_at_period_end: Some(false),
            ..Default::default()
        };
        let subscription = Subscription::update(&self.client, &sub_id, params).await?;

        Ok(gateway_subscription(subscription))
    }

    async fn extend_trial(
        &self,
        subscription_id: &str,
        until: NaiveDateTime,
    ) -> GatewayResult<GatewaySubscription> {
        let sub_id = subscription_id.parse::<SubscriptionId>()?;
        let params = UpdateSubscription {
            trial_end: Some(Scheduled::Timestamp(until.and_utc().timestamp())),
            ..Default::default()
        };
        let subscription = Subscription::update(&self.client, &sub_id, params).await?;

        Ok(gateway_subscription(subscription))
    }

    async fn create_invoice(
        &self,
        customer_id: &str,
        lines: &[InvoiceLine],
        due_date: Option<NaiveDate>,
    ) -> GatewayResult<GatewayInvoice> {
        let customer_id = customer_id.parse::<CustomerId>()?;

        // Pending invoice items are swept onto the next invoice created for
        // the customer.
        for line in lines {
            let mut item_params = CreateInvoiceItem::new(customer_id.clone());
            item_params.amount = Some(line.amount_cents);
            item_params.currency = Some(Currency::USD);
            item_params.description = Some(&line.description);
            stripe::InvoiceItem::create(&self.client, item_params).await?;
        }

        let days_until_due = due_date.map(|due| {
            let today = Utc::now().date_naive();
            (due - today).num_days().clamp(1, 365) as u32
        });

        let invoice_params = CreateInvoice {
            customer: Some(customer_id),
            collection_method: Some(CollectionMethod::SendInvoice),
            days_until_due,
            ..Default::default()
        };
        let invoice = Invoice::create(&self.client, invoice_params).await?;

        Ok(GatewayInvoice {
            id: invoice.id.to_string(),
            number: invoice.number,
        })
    }

    async fn finalize_invoice(&self, invoice_id: &str) -> GatewayResult<GatewayInvoice> {
        let invoice_id = invoice_id.parse::<InvoiceId>()?;
        let invoice = Invoice::finalize(&self.client, &invoice_id, Default::default()).await?;

        Ok(GatewayInvoice {
            id: invoice.id.to_string(),
            number: invoice.number,
        })
    }

    async fn create_payment_intent(
        &self,
        customer_id: &str,
        amount_cents: i64,
        deposit_account_id: &str,
        description: &str,
    ) -> GatewayResult<GatewayPaymentIntent> {
        let mut params = CreatePaymentIntent::new(amount_cents, Currency::USD);
        params.customer = Some(customer_id.parse::<CustomerId>()?);
        params.description = Some(description);
        params.transfer_data = Some(CreatePaymentIntentTransferData {
            amount: None,
            destination: deposit_account_id.to_string(),
        });
        let intent = PaymentIntent::create(&self.client, params).await?;

        Ok(GatewayPaymentIntent {
            id: intent.id.to_string(),
            client_secret: intent.client_secret,
        })
    }

    async fn cancel_payment_intent(&self, intent_id: &str) -> GatewayResult<()> {
        let intent_id = intent_id.parse::<PaymentIntentId>()?;
        PaymentIntent::cancel(&self.client, &intent_id, CancelPaymentIntent::default()).await?;

        Ok(())
    }

    async fn create_deposit_account(&self, email: &str) -> GatewayResult<GatewayAccount> {
        let params = CreateAccount {
            type_: Some(AccountType::Express),
            email: Some(email),
            capabilities: Some(CreateAccountCapabilities {
                card_payments: Some(CreateAccountCapabilitiesCardPayments {
                    requested: Some(true),
                }),
                transfers: Some(CreateAccountCapabilitiesTransfers {
                    requested: Some(true),
                }),
                tax_reporting_us_1099_misc: Some(CreateAccountCapabilitiesTaxReportingUs1099Misc {
                    requested: Some(true),
                }),
                tax_reporting_us_1099_k: Some(CreateAccountCapabilitiesTaxReportingUs1099K {
                    requested: Some(true),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let account = Account::create(&self.client, params).await?;

        Ok(gateway_account(account))
    }

    async fn create_onboarding_link(
        &self,
        account_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> GatewayResult<GatewayAccountLink> {
        let account_id = account_id.parse::<AccountId>()?;
        let mut params = CreateAccountLink::new(account_id, AccountLinkType::AccountOnboarding);
        params.refresh_url = Some(refresh_url);
        params.return_url = Some(return_url);
        let link = AccountLink::create(&self.client, params).await?;

        Ok(GatewayAccountLink { url: link.url })
    }

    async fn retrieve_deposit_account(&self, account_id: &str) -> GatewayResult<GatewayAccount> {
        let account_id = account_id.parse::<AccountId>()?;
        let account = Account::retrieve(&self.client, &account_id, &[]).await?;

        Ok(gateway_account(account))
    }
}
