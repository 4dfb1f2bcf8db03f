use chrono::{Duration, Utc};

use accord_crm::domain::invoice::InvoiceStatus;
use accord_crm::domain::matter::RateType;
use accord_crm::domain::payment::PaymentState;
use accord_crm::domain::processor_event::{
    EventRecordStatus, ProcessorEvent, ProcessorEventEnvelope,
};
use accord_crm::domain::subscription::{NewSubscription, PlanType, SubscriptionStatus};
use accord_crm::forms::billing_items::CreateBillingItemForm;
use accord_crm::repository::{
    DieselRepository, InvoiceReader, MediatorReader, MediatorWriter, NotificationReader,
    PaymentReader, ProcessorEventStore, SubscriptionReader, SubscriptionWriter,
};
use accord_crm::services::reconciliation::{ReconcileOutcome, apply_event};
use accord_crm::services::{billing_items, clients, invoices, matters};

mod common;

use common::{StubGateway, TestDb, client_user, mediator_user};

fn envelope(event_id: &str, event_type: &str, event: ProcessorEvent) -> ProcessorEventEnvelope {
    ProcessorEventEnvelope {
        event_id: event_id.to_string(),
        event_type: event_type.to_string(),
        event: Some(event),
    }
}

/// A mediator with a verified deposit account and an open, in-payment
/// invoice whose payment intent is `pi_cus_alice@example.com`.
struct PaidSetup {
    repo: DieselRepository,
    invoice_id: i32,
    mediator_id: i32,
}

async fn setup_invoice_payment(db: &TestDb) -> PaidSetup {
    let repo = db.repo();
    let mediator_auth = mediator_user("jane@example.com");
    let client_auth = client_user("alice@example.com");

    let client = clients::register_client(
        &repo,
        &mediator_auth,
        accord_crm::domain::client::NewClient::new(
            accord_crm::domain::types::Email::new("alice@example.com").unwrap(),
            "Alice".to_string(),
            None,
        ),
    )
    .unwrap();

    let matter = matters::create_matter(
        &repo,
        &mediator_auth,
        matters::CreateMatter {
            client_id: client.id,
            title: "Estate mediation".to_string(),
            description: String::new(),
            rate_type: RateType::Hourly,
            rate_cents: 20000,
        },
    )
    .unwrap();

    let today = Utc::now().date_naive();
    let invoice = invoices::create_invoice(
        &repo,
        &mediator_auth,
        invoices::CreateInvoice {
            matter_id: matter.id,
            title: None,
            note: None,
            period_start: today - Duration::days(30),
            period_end: today,
            due_date: Some(today + Duration::days(14)),
            tax_rate_bps: 0,
            email: None,
        },
    )
    .unwrap();

    let form = CreateBillingItemForm {
        matter_id: matter.id,
        description: "Session".to_string(),
        kind: Some("time".to_string()),
        work_date: today,
        time_spent_minutes: Some(60),
        hourly_rate_cents: Some(20000),
        rate_cents: None,
        quantity: None,
        total_cents: None,
        is_billable: true,
        currency: None,
    };
    let item =
        billing_items::add_billing_item(&repo, &mediator_auth, matter.id, (&form).into()).unwrap();
    invoices::attach_billing_items(&repo, &mediator_auth, invoice.id, &[item.id]).unwrap();

    let gateway = StubGateway::default();
    invoices::send_invoice(&repo, &gateway, &mediator_auth, invoice.id)
        .await
        .unwrap();

    let mediator_row = clients::resolve_mediator(&repo, &mediator_auth).unwrap();
    repo.ensure_finance_profile(mediator_row.id).unwrap();
    repo.set_profile_deposit_account(mediator_row.id, "acct_jane")
        .unwrap();
    repo.set_deposit_account_state(
        "acct_jane",
        accord_crm::domain::mediator::DepositAccountState {
            charges_enabled: true,
            payouts_enabled: true,
            details_submitted: true,
        },
    )
    .unwrap();

    invoices::start_invoice_payment(&repo, &gateway, &client_auth, invoice.id)
        .await
        .unwrap();

    PaidSetup {
        repo,
        invoice_id: invoice.id,
        mediator_id: mediator_row.id,
    }
}

#[actix_web::test]
async fn payment_intent_succeeded_settles_invoice() {
    let db = TestDb::new("recon_intent_success.db");
    let setup = setup_invoice_payment(&db).await;
    let gateway = StubGateway::default();

    let outcome = apply_event(
        &setup.repo,
        &gateway,
        &envelope(
            "evt_1",
            "payment_intent.succeeded",
            ProcessorEvent::PaymentIntentSucceeded {
                intent_id: "pi_cus_alice@example.com".to_string(),
            },
        ),
    )
    .await
    .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied);

    let invoice = setup.repo.get_invoice_by_id(setup.invoice_id).unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.payment_status, PaymentState::Paid);

    let payment = setup
        .repo
        .get_payment_by_intent("pi_cus_alice@example.com")
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentState::Paid);

    // Both sides were notified.
    let (client_total, _) = setup
        .repo
        .list_notifications("alice@example.com", None)
        .unwrap();
    let (mediator_total, _) = setup
        .repo
        .list_notifications("jane@example.com", None)
        .unwrap();
    assert_eq!(client_total, 1);
    assert_eq!(mediator_total, 1);
}

#[actix_web::test]
async fn duplicate_event_is_applied_once() {
    let db = TestDb::new("recon_duplicate.db");
    let setup = setup_invoice_payment(&db).await;
    let gateway = StubGateway::default();

    let env = envelope(
        "evt_dup",
        "payment_intent.succeeded",
        ProcessorEvent::PaymentIntentSucceeded {
            intent_id: "pi_cus_alice@example.com".to_string(),
        },
    );

    assert_eq!(
        apply_event(&setup.repo, &gateway, &env).await.unwrap(),
        ReconcileOutcome::Applied
    );
    assert_eq!(
        apply_event(&setup.repo, &gateway, &env).await.unwrap(),
        ReconcileOutcome::Duplicate
    );

    // Only one notification per recipient despite redelivery.
    let (client_total, _) = setup
        .repo
        .list_notifications("alice@example.com", None)
        .unwrap();
    assert_eq!(client_total, 1);
}

#[actix_web::test]
async fn late_success_after_cancellation_is_ignored() {
    let db = TestDb::new("recon_ordering.db");
    let setup = setup_invoice_payment(&db).await;
    let gateway = StubGateway::default();

    let canceled = apply_event(
        &setup.repo,
        &gateway,
        &envelope(
            "evt_cancel",
            "payment_intent.canceled",
            ProcessorEvent::PaymentIntentCanceled {
                intent_id: "pi_cus_alice@example.com".to_string(),
            },
        ),
    )
    .await
    .unwrap();
    assert_eq!(canceled, ReconcileOutcome::Applied);

    // The late success arrives after cancellation cleared the intent link:
    // nothing to apply, nothing corrupted.
    let late = apply_event(
        &setup.repo,
        &gateway,
        &envelope(
            "evt_late",
            "payment_intent.succeeded",
            ProcessorEvent::PaymentIntentSucceeded {
                intent_id: "pi_cus_alice@example.com".to_string(),
            },
        ),
    )
    .await
    .unwrap();
    assert_eq!(late, ReconcileOutcome::Skipped);

    let invoice = setup.repo.get_invoice_by_id(setup.invoice_id).unwrap().unwrap();
    assert_ne!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.payment_status, PaymentState::NotStarted);
}

#[actix_web::test]
async fn unlinked_intent_is_skipped() {
    let db = TestDb::new("recon_unlinked.db");
    let repo = db.repo();
    let gateway = StubGateway::default();

    let outcome = apply_event(
        &repo,
        &gateway,
        &envelope(
            "evt_orphan",
            "payment_intent.succeeded",
            ProcessorEvent::PaymentIntentSucceeded {
                intent_id: "pi_orphan".to_string(),
            },
        ),
    )
    .await
    .unwrap();

    assert_eq!(outcome, ReconcileOutcome::Skipped);
    let record = repo.get_event_record("evt_orphan").unwrap().unwrap();
    assert_eq!(record.status, EventRecordStatus::Skipped);
}

#[actix_web::test]
async fn unhandled_event_type_is_acknowledged() {
    let db = TestDb::new("recon_unhandled.db");
    let repo = db.repo();
    let gateway = StubGateway::default();

    let outcome = apply_event(
        &repo,
        &gateway,
        &ProcessorEventEnvelope {
            event_id: "evt_noop".to_string(),
            event_type: "customer.created".to_string(),
            event: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome, ReconcileOutcome::Skipped);
    let record = repo.get_event_record("evt_noop").unwrap().unwrap();
    assert_eq!(record.status, EventRecordStatus::Skipped);
}

/// A mediator with a premium subscription mirrored locally.
fn setup_subscription(repo: &DieselRepository, plan: PlanType) -> i32 {
    let mediator_auth = mediator_user("jane@example.com");
    let mediator = clients::resolve_mediator(repo, &mediator_auth).unwrap();
    repo.ensure_finance_profile(mediator.id).unwrap();
    repo.set_profile_customer_id(mediator.id, "cus_jane").unwrap();
    repo.upsert_subscription(&NewSubscription {
        mediator_id: mediator.id,
        processor_id: "sub_jane".to_string(),
        plan,
        status: SubscriptionStatus::Active,
        current_period_end: None,
    })
    .unwrap();

    mediator.id
}

#[actix_web::test]
async fn premium_payment_marks_mediator_featured() {
    let db = TestDb::new("recon_featured.db");
    let repo = db.repo();
    let gateway = StubGateway::default();
    let mediator_id = setup_subscription(&repo, PlanType::Premium);

    let outcome = apply_event(
        &repo,
        &gateway,
        &envelope(
            "evt_paid",
            "invoice.payment_succeeded",
            ProcessorEvent::SubscriptionInvoicePaid {
                customer_id: "cus_jane".to_string(),
                subscription_id: Some("sub_jane".to_string()),
                period_end: None,
            },
        ),
    )
    .await
    .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied);

    let mediator = repo.get_mediator_by_id(mediator_id).unwrap().unwrap();
    assert!(mediator.featured);

    // A later failure revokes the flag.
    apply_event(
        &repo,
        &gateway,
        &envelope(
            "evt_failed",
            "invoice.payment_failed",
            ProcessorEvent::SubscriptionPaymentFailed {
                customer_id: Some("cus_jane".to_string()),
                subscription_id: Some("sub_jane".to_string()),
                subscription_ended: false,
            },
        ),
    )
    .await
    .unwrap();

    let mediator = repo.get_mediator_by_id(mediator_id).unwrap().unwrap();
    assert!(!mediator.featured);
    let sub = repo.get_subscription_by_processor_id("sub_jane").unwrap().unwrap();
    assert_eq!(sub.status, SubscriptionStatus::PastDue);
}

#[actix_web::test]
async fn promo_period_is_granted_exactly_once() {
    let db = TestDb::new("recon_promo.db");
    let repo = db.repo();
    let gateway = StubGateway::default();
    let mediator_id = setup_subscription(&repo, PlanType::Standard);

    let renewal = |event_id: &str| {
        envelope(
            event_id,
            "invoice.created",
            ProcessorEvent::SubscriptionInvoiceCreated {
                customer_id: "cus_jane".to_string(),
                subscription_id: Some("sub_jane".to_string()),
                billing_reason: Some("subscription_cycle".to_string()),
            },
        )
    };

    assert_eq!(
        apply_event(&repo, &gateway, &renewal("evt_cycle_1")).await.unwrap(),
        ReconcileOutcome::Applied
    );
    assert!(
        gateway
            .recorded_calls()
            .iter()
            .any(|c| c == "extend_trial:sub_jane")
    );
    let profile = repo.get_finance_profile(mediator_id).unwrap().unwrap();
    assert!(profile.was_promo_period_provided);

    // The next cycle must not extend again.
    let gateway2 = StubGateway::default();
    assert_eq!(
        apply_event(&repo, &gateway2, &renewal("evt_cycle_2")).await.unwrap(),
        ReconcileOutcome::Skipped
    );
    assert!(gateway2.recorded_calls().is_empty());

    // A first invoice (subscription_create) never grants the promo.
    let db2 = TestDb::new("recon_promo_create.db");
    let repo2 = db2.repo();
    setup_subscription(&repo2, PlanType::Standard);
    let outcome = apply_event(
        &repo2,
        &gateway2,
        &envelope(
            "evt_create",
            "invoice.created",
            ProcessorEvent::SubscriptionInvoiceCreated {
                customer_id: "cus_jane".to_string(),
                subscription_id: Some("sub_jane".to_string()),
                billing_reason: Some("subscription_create".to_string()),
            },
        ),
    )
    .await
    .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Skipped);
}

#[actix_web::test]
async fn promo_grant_failure_is_retried_on_redelivery() {
    let db = TestDb::new("recon_promo_retry.db");
    let repo = db.repo();
    let mediator_id = setup_subscription(&repo, PlanType::Standard);

    let env = envelope(
        "evt_cycle",
        "invoice.created",
        ProcessorEvent::SubscriptionInvoiceCreated {
            customer_id: "cus_jane".to_string(),
            subscription_id: Some("sub_jane".to_string()),
            billing_reason: Some("subscription_cycle".to_string()),
        },
    );

    // The processor call fails: the claim is released, the flag stays unset.
    let failing = StubGateway::failing();
    assert!(apply_event(&repo, &failing, &env).await.is_err());
    let profile = repo.get_finance_profile(mediator_id).unwrap().unwrap();
    assert!(!profile.was_promo_period_provided);

    // Redelivery with a healthy processor succeeds.
    let healthy = StubGateway::default();
    assert_eq!(
        apply_event(&repo, &healthy, &env).await.unwrap(),
        ReconcileOutcome::Applied
    );
    let profile = repo.get_finance_profile(mediator_id).unwrap().unwrap();
    assert!(profile.was_promo_period_provided);
}

#[actix_web::test]
async fn account_updates_mirror_verification_state() {
    let db = TestDb::new("recon_account.db");
    let repo = db.repo();
    let gateway = StubGateway::default();

    let mediator_auth = mediator_user("jane@example.com");
    let mediator = clients::resolve_mediator(&repo, &mediator_auth).unwrap();
    repo.ensure_finance_profile(mediator.id).unwrap();
    repo.set_profile_deposit_account(mediator.id, "acct_jane").unwrap();

    let outcome = apply_event(
        &repo,
        &gateway,
        &envelope(
            "evt_acct",
            "account.updated",
            ProcessorEvent::AccountUpdated {
                account_id: "acct_jane".to_string(),
                charges_enabled: true,
                payouts_enabled: true,
                details_submitted: true,
            },
        ),
    )
    .await
    .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied);

    let profile = repo.get_finance_profile(mediator.id).unwrap().unwrap();
    assert!(profile.account_verified);
    let (total, _) = repo.list_notifications("jane@example.com", None).unwrap();
    assert_eq!(total, 1);

    // A capability change re-syncs from the processor.
    let resync_gateway = StubGateway {
        account_verified: false,
        ..Default::default()
    };
    apply_event(
        &repo,
        &resync_gateway,
        &envelope(
            "evt_cap",
            "capability.updated",
            ProcessorEvent::CapabilityUpdated {
                account_id: "acct_jane".to_string(),
            },
        ),
    )
    .await
    .unwrap();

    let profile = repo.get_finance_profile(mediator.id).unwrap().unwrap();
    assert!(!profile.account_verified);

    // Events for unknown accounts are skipped.
    let outcome = apply_event(
        &repo,
        &gateway,
        &envelope(
            "evt_unknown",
            "account.updated",
            ProcessorEvent::AccountUpdated {
                account_id: "acct_nobody".to_string(),
                charges_enabled: true,
                payouts_enabled: true,
                details_submitted: true,
            },
        ),
    )
    .await
    .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Skipped);
}

#[actix_web::test]
async fn subscription_deletion_revokes_access_and_notifies() {
    let db = TestDb::new("recon_sub_deleted.db");
    let repo = db.repo();
    let gateway = StubGateway::default();
    let mediator_id = setup_subscription(&repo, PlanType::Premium);
    repo.set_mediator_featured(mediator_id, true).unwrap();

    let outcome = apply_event(
        &repo,
        &gateway,
        &envelope(
            "evt_deleted",
            "customer.subscription.deleted",
            ProcessorEvent::SubscriptionPaymentFailed {
                customer_id: Some("cus_jane".to_string()),
                subscription_id: Some("sub_jane".to_string()),
                subscription_ended: true,
            },
        ),
    )
    .await
    .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied);

    let sub = repo.get_subscription_by_processor_id("sub_jane").unwrap().unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Canceled);
    let mediator = repo.get_mediator_by_id(mediator_id).unwrap().unwrap();
    assert!(!mediator.featured);
    let (total, _) = repo.list_notifications("jane@example.com", None).unwrap();
    assert_eq!(total, 1);

    // Deleted users no longer break processing.
    let outcome = apply_event(
        &repo,
        &gateway,
        &envelope(
            "evt_ghost",
            "customer.subscription.deleted",
            ProcessorEvent::SubscriptionPaymentFailed {
                customer_id: Some("cus_ghost".to_string()),
                subscription_id: Some("sub_ghost".to_string()),
                subscription_ended: true,
            },
        ),
    )
    .await
    .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Skipped);
}
