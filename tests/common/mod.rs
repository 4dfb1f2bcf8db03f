use std::cell::RefCell;

use chrono::{NaiveDateTime, Utc};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::TempDir;

use accord_crm::auth::AuthenticatedUser;
use accord_crm::billing::{
    GatewayAccount, GatewayAccountLink, GatewayCustomer, GatewayError, GatewayInvoice,
    GatewayPaymentIntent, GatewayResult, GatewaySubscription, InvoiceLine, PaymentGateway,
};
use accord_crm::db::{DbPool, establish_connection_pool};
use accord_crm::domain::mediator::DepositAccountState;
use accord_crm::domain::subscription::{PlanType, SubscriptionStatus};
use accord_crm::repository::DieselRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// A scratch SQLite database that lives for one test.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool =
            establish_connection_pool(path.to_str().expect("utf-8 path")).expect("create pool");
        let mut conn = pool.get().expect("get connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("run migrations");

        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool.clone())
    }
}

pub fn mediator_user(email: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: format!("sub-{email}"),
        email: email.to_string(),
        name: "Test Mediator".to_string(),
        roles: vec!["mediator".to_string()],
        exp: (Utc::now().timestamp() + 3600) as usize,
    }
}

pub fn client_user(email: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: format!("sub-{email}"),
        email: email.to_string(),
        name: "Test Client".to_string(),
        roles: vec!["client".to_string()],
        exp: (Utc::now().timestamp() + 3600) as usize,
    }
}

/// Canned payment gateway: every call succeeds and is recorded, so tests
/// can assert which processor operations ran without any network.
#[derive(Default)]
pub struct StubGateway {
    pub calls: RefCell<Vec<String>>,
    /// When set, every call fails with a processor error instead.
    pub fail: bool,
    /// Verification state returned by `retrieve_deposit_account`.
    pub account_verified: bool,
}

impl StubGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) -> GatewayResult<()> {
        if self.fail {
            return Err(GatewayError::Api("stub failure".to_string()));
        }
        self.calls.borrow_mut().push(call.into());
        Ok(())
    }
}

impl PaymentGateway for StubGateway {
    async fn create_customer(&self, email: &str, _name: &str) -> GatewayResult<GatewayCustomer> {
        self.record(format!("create_customer:{email}"))?;
        Ok(GatewayCustomer {
            id: format!("cus_{email}"),
        })
    }

    async fn create_subscription(
        &self,
        customer_id: &str,
        plan: PlanType,
    ) -> GatewayResult<GatewaySubscription> {
        self.record(format!("create_subscription:{customer_id}:{plan}"))?;
        Ok(GatewaySubscription {
            id: format!("sub_{customer_id}"),
            status: SubscriptionStatus::Active,
            current_period_end: None,
            cancel_at_period_end: false,
        })
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> GatewayResult<GatewaySubscription> {
        self.record(format!("cancel_subscription:{subscription_id}"))?;
        Ok(GatewaySubscription {
            id: subscription_id.to_string(),
            status: SubscriptionStatus::Active,
            current_period_end: None,
            cancel_at_period_end: at_period_end,
        })
    }

    async fn resume_subscription(
        &self,
        subscription_id: &str,
    ) -> GatewayResult<GatewaySubscription> {
        self.record(format!("resume_subscription:{subscription_id}"))?;
        Ok(GatewaySubscription {
            id: subscription_id.to_string(),
            status: SubscriptionStatus::Active,
            current_period_end: None,
            cancel_at_period_end: false,
        })
    }

    async fn extend_trial(
        &self,
        subscription_id: &str,
        until: NaiveDateTime,
    ) -> GatewayResult<GatewaySubscription> {
        self.record(format!("extend_trial:{subscription_id}"))?;
        Ok(GatewaySubscription {
            id: subscription_id.to_string(),
            status: SubscriptionStatus::Trialing,
            current_period_end: Some(until),
            cancel_at_period_end: false,
        })
    }

    async fn create_invoice(
        &self,
        customer_id: &str,
        lines: &[InvoiceLine],
        _due_date: Option<chrono::NaiveDate>,
    ) -> GatewayResult<GatewayInvoice> {
        self.record(format!("create_invoice:{customer_id}:{}", lines.len()))?;
        Ok(GatewayInvoice {
            id: format!("in_{customer_id}"),
            number: None,
        })
    }

    async fn finalize_invoice(&self, invoice_id: &str) -> GatewayResult<GatewayInvoice> {
        self.record(format!("finalize_invoice:{invoice_id}"))?;
        Ok(GatewayInvoice {
            id: invoice_id.to_string(),
            number: Some("INV-0001".to_string()),
        })
    }

    async fn create_payment_intent(
        &self,
        customer_id: &str,
        amount_cents: i64,
        _deposit_account_id: &str,
        _description: &str,
    ) -> GatewayResult<GatewayPaymentIntent> {
        self.record(format!("create_payment_intent:{customer_id}:{amount_cents}"))?;
        Ok(GatewayPaymentIntent {
            id: format!("pi_{customer_id}"),
            client_secret: Some("secret".to_string()),
        })
    }

    async fn cancel_payment_intent(&self, intent_id: &str) -> GatewayResult<()> {
        self.record(format!("cancel_payment_intent:{intent_id}"))
    }

    async fn create_deposit_account(&self, email: &str) -> GatewayResult<GatewayAccount> {
        self.record(format!("create_deposit_account:{email}"))?;
        Ok(GatewayAccount {
            id: format!("acct_{email}"),
            state: DepositAccountState::default(),
        })
    }

    async fn create_onboarding_link(
        &self,
        account_id: &str,
        _refresh_url: &str,
        _return_url: &str,
    ) -> GatewayResult<GatewayAccountLink> {
        self.record(format!("create_onboarding_link:{account_id}"))?;
        Ok(GatewayAccountLink {
            url: format!("https://onboarding.example/{account_id}"),
        })
    }

    async fn retrieve_deposit_account(&self, account_id: &str) -> GatewayResult<GatewayAccount> {
        self.record(format!("retrieve_deposit_account:{account_id}"))?;
        Ok(GatewayAccount {
            id: account_id.to_string(),
            state: DepositAccountState {
                charges_enabled: self.account_verified,
                payouts_enabled: self.account_verified,
                details_submitted: self.account_verified,
            },
        })
    }
}
