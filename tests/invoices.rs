use chrono::{Duration, Utc};

use accord_crm::domain::invoice::InvoiceStatus;
use accord_crm::domain::matter::RateType;
use accord_crm::domain::payment::PaymentState;
use accord_crm::forms::billing_items::CreateBillingItemForm;
use accord_crm::repository::{DieselRepository, InvoiceReader, InvoiceWriter, MediatorWriter};
use accord_crm::services::{
    ServiceError, billing_items, clients, invoices, matters,
};

mod common;

use common::{StubGateway, TestDb, client_user, mediator_user};

struct Fixture {
    repo: DieselRepository,
    mediator: accord_crm::auth::AuthenticatedUser,
    client: accord_crm::auth::AuthenticatedUser,
    matter_id: i32,
}

fn fixture(db: &TestDb, rate_type: RateType) -> Fixture {
    let repo = db.repo();
    let mediator = mediator_user("jane@example.com");
    let client_auth = client_user("alice@example.com");

    let client = clients::register_client(
        &repo,
        &mediator,
        accord_crm::domain::client::NewClient::new(
            accord_crm::domain::types::Email::new("alice@example.com").unwrap(),
            "Alice".to_string(),
            None,
        ),
    )
    .unwrap();

    let matter = matters::create_matter(
        &repo,
        &mediator,
        matters::CreateMatter {
            client_id: client.id,
            title: "Estate mediation".to_string(),
            description: String::new(),
            rate_type,
            rate_cents: 20000,
        },
    )
    .unwrap();

    Fixture {
        repo,
        mediator,
        client: client_auth,
        matter_id: matter.id,
    }
}

fn billing_item_form(matter_id: i32, minutes: i32) -> CreateBillingItemForm {
    CreateBillingItemForm {
        matter_id,
        description: "Session".to_string(),
        kind: Some("time".to_string()),
        work_date: Utc::now().date_naive(),
        time_spent_minutes: Some(minutes),
        hourly_rate_cents: Some(20000),
        rate_cents: None,
        quantity: None,
        total_cents: None,
        is_billable: true,
        currency: None,
    }
}

fn create_period_invoice(f: &Fixture) -> accord_crm::domain::invoice::Invoice {
    let today = Utc::now().date_naive();
    invoices::create_invoice(
        &f.repo,
        &f.mediator,
        invoices::CreateInvoice {
            matter_id: f.matter_id,
            title: None,
            note: None,
            period_start: today - Duration::days(30),
            period_end: today,
            due_date: Some(today + Duration::days(14)),
            tax_rate_bps: 1000,
            email: None,
        },
    )
    .unwrap()
}

#[test]
fn invoice_is_get_or_create_per_period() {
    let db = TestDb::new("svc_invoice_period.db");
    let f = fixture(&db, RateType::Hourly);

    let first = create_period_invoice(&f);
    let second = create_period_invoice(&f);
    assert_eq!(first.id, second.id);
    assert_eq!(first.status, InvoiceStatus::Draft);
    // The default title comes from the matter.
    assert!(first.title.contains("Estate mediation"));
}

#[test]
fn invoices_require_hourly_matters() {
    let db = TestDb::new("svc_invoice_flat.db");
    let f = fixture(&db, RateType::Flat);

    let today = Utc::now().date_naive();
    let result = invoices::create_invoice(
        &f.repo,
        &f.mediator,
        invoices::CreateInvoice {
            matter_id: f.matter_id,
            title: None,
            note: None,
            period_start: today,
            period_end: today,
            due_date: None,
            tax_rate_bps: 0,
            email: None,
        },
    );
    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[test]
fn attachment_enforces_period_containment() {
    let db = TestDb::new("svc_invoice_attach.db");
    let f = fixture(&db, RateType::Hourly);
    let invoice = create_period_invoice(&f);

    let mut outside = billing_item_form(f.matter_id, 60);
    outside.work_date = Utc::now().date_naive() - Duration::days(90);
    let outside_item =
        billing_items::add_billing_item(&f.repo, &f.mediator, f.matter_id, (&outside).into())
            .unwrap();

    let result =
        invoices::attach_billing_items(&f.repo, &f.mediator, invoice.id, &[outside_item.id]);
    assert!(matches!(result, Err(ServiceError::Validation(_))));

    let inside = billing_item_form(f.matter_id, 90);
    let inside_item =
        billing_items::add_billing_item(&f.repo, &f.mediator, f.matter_id, (&inside).into())
            .unwrap();
    let attached =
        invoices::attach_billing_items(&f.repo, &f.mediator, invoice.id, &[inside_item.id])
            .unwrap();
    assert_eq!(attached, 1);

    let details = invoices::get_invoice_details(&f.repo, &f.mediator, invoice.id).unwrap();
    // 90 minutes at $200/h = $300, plus 10% tax.
    assert_eq!(details.fees_earned_cents, 30000);
    assert_eq!(details.total_cents, 33000);
    assert_eq!(details.time_billed_minutes, 90);
}

#[actix_web::test]
async fn send_invoice_advances_state_and_records_number() {
    let db = TestDb::new("svc_invoice_send.db");
    let f = fixture(&db, RateType::Hourly);
    let invoice = create_period_invoice(&f);

    let item = billing_item_form(f.matter_id, 60);
    let item =
        billing_items::add_billing_item(&f.repo, &f.mediator, f.matter_id, (&item).into())
            .unwrap();
    invoices::attach_billing_items(&f.repo, &f.mediator, invoice.id, &[item.id]).unwrap();

    let gateway = StubGateway::default();
    let sent = invoices::send_invoice(&f.repo, &gateway, &f.mediator, invoice.id)
        .await
        .unwrap();

    assert_eq!(sent.status, InvoiceStatus::Open);
    assert_eq!(sent.number.as_deref(), Some("INV-0001"));
    assert!(sent.processor_id.is_some());
    assert!(sent.finalized_at.is_some());

    let calls = gateway.recorded_calls();
    assert!(calls.iter().any(|c| c.starts_with("create_customer:")));
    assert!(calls.iter().any(|c| c.starts_with("create_invoice:")));
    assert!(calls.iter().any(|c| c.starts_with("finalize_invoice:")));

    // Re-sending an open invoice is rejected.
    let again = invoices::send_invoice(&f.repo, &gateway, &f.mediator, invoice.id).await;
    assert!(matches!(again, Err(ServiceError::Conflict(_))));
}

#[actix_web::test]
async fn processor_failure_leaves_invoice_draft() {
    let db = TestDb::new("svc_invoice_send_fail.db");
    let f = fixture(&db, RateType::Hourly);
    let invoice = create_period_invoice(&f);

    let item = billing_item_form(f.matter_id, 60);
    let item =
        billing_items::add_billing_item(&f.repo, &f.mediator, f.matter_id, (&item).into())
            .unwrap();
    invoices::attach_billing_items(&f.repo, &f.mediator, invoice.id, &[item.id]).unwrap();

    let gateway = StubGateway::failing();
    let result = invoices::send_invoice(&f.repo, &gateway, &f.mediator, invoice.id).await;
    assert!(result.is_err());

    let reloaded = f.repo.get_invoice_by_id(invoice.id).unwrap().unwrap();
    assert_eq!(reloaded.status, InvoiceStatus::Draft);
    assert!(reloaded.processor_id.is_none());
}

#[actix_web::test]
async fn payment_requires_verified_deposit_account() {
    let db = TestDb::new("svc_invoice_pay.db");
    let f = fixture(&db, RateType::Hourly);
    let invoice = create_period_invoice(&f);

    let item = billing_item_form(f.matter_id, 60);
    let item =
        billing_items::add_billing_item(&f.repo, &f.mediator, f.matter_id, (&item).into())
            .unwrap();
    invoices::attach_billing_items(&f.repo, &f.mediator, invoice.id, &[item.id]).unwrap();

    let gateway = StubGateway::default();
    invoices::send_invoice(&f.repo, &gateway, &f.mediator, invoice.id)
        .await
        .unwrap();

    // No deposit account yet.
    let denied =
        invoices::start_invoice_payment(&f.repo, &gateway, &f.client, invoice.id).await;
    assert!(denied.is_err());

    // Verify the mediator's account and retry.
    let mediator_row = clients::resolve_mediator(&f.repo, &f.mediator).unwrap();
    f.repo.ensure_finance_profile(mediator_row.id).unwrap();
    f.repo
        .set_profile_deposit_account(mediator_row.id, "acct_jane")
        .unwrap();
    f.repo
        .set_deposit_account_state(
            "acct_jane",
            accord_crm::domain::mediator::DepositAccountState {
                charges_enabled: true,
                payouts_enabled: true,
                details_submitted: true,
            },
        )
        .unwrap();

    let start = invoices::start_invoice_payment(&f.repo, &gateway, &f.client, invoice.id)
        .await
        .unwrap();
    assert_eq!(start.payment.status, PaymentState::InProgress);
    assert!(start.payment.intent_id.is_some());
    assert_eq!(start.client_secret.as_deref(), Some("secret"));

    // A second attempt while one is in flight is rejected.
    let second = invoices::start_invoice_payment(&f.repo, &gateway, &f.client, invoice.id).await;
    assert!(matches!(second, Err(ServiceError::Conflict(_))));
}

#[test]
fn overdue_sweep_transitions_open_invoices() {
    let db = TestDb::new("svc_invoice_overdue.db");
    let f = fixture(&db, RateType::Hourly);

    let today = Utc::now().date_naive();
    let invoice = invoices::create_invoice(
        &f.repo,
        &f.mediator,
        invoices::CreateInvoice {
            matter_id: f.matter_id,
            title: None,
            note: None,
            period_start: today - Duration::days(60),
            period_end: today - Duration::days(31),
            due_date: Some(today - Duration::days(1)),
            tax_rate_bps: 0,
            email: None,
        },
    )
    .unwrap();

    // Draft invoices are never swept.
    assert_eq!(invoices::mark_overdue_invoices(&f.repo, today).unwrap(), 0);

    // Open it directly through the state machine and persist.
    let mut open = f.repo.get_invoice_by_id(invoice.id).unwrap().unwrap();
    open.send().unwrap();
    f.repo.save_invoice_state(&open).unwrap();

    assert_eq!(invoices::mark_overdue_invoices(&f.repo, today).unwrap(), 1);
    let reloaded = f.repo.get_invoice_by_id(invoice.id).unwrap().unwrap();
    assert_eq!(reloaded.status, InvoiceStatus::Overdue);

    // The sweep is idempotent.
    assert_eq!(invoices::mark_overdue_invoices(&f.repo, today).unwrap(), 0);
}
