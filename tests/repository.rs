use chrono::Utc;

use accord_crm::domain::billing_item::{BillingKind, NewBillingItem};
use accord_crm::domain::client::NewClient;
use accord_crm::domain::matter::{MatterStatus, NewMatter, RateType};
use accord_crm::domain::mediator::{DepositAccountState, NewMediator};
use accord_crm::domain::processor_event::EventRecordStatus;
use accord_crm::domain::types::Email;
use accord_crm::repository::{
    BillingItemListQuery, BillingItemReader, BillingItemWriter, ClientReader, ClientWriter,
    InvoiceWriter, MatterListQuery, MatterReader, MatterWriter, MediatorReader, MediatorWriter,
    ProcessorEventStore,
};

mod common;

fn new_client(email: &str, name: &str) -> NewClient {
    NewClient::new(Email::new(email).unwrap(), name.to_string(), None)
}

fn new_matter(mediator_id: i32, client_id: i32, code: &str) -> NewMatter {
    NewMatter {
        code: code.to_string(),
        mediator_id,
        client_id,
        title: "Estate mediation".to_string(),
        description: String::new(),
        rate_type: RateType::Hourly,
        rate_cents: 20000,
    }
}

#[test]
fn client_crud_round_trip() {
    let test_db = common::TestDb::new("repo_clients.db");
    let repo = test_db.repo();

    let created = repo.create_client(&new_client("alice@example.com", "Alice")).unwrap();
    assert_eq!(created.email, "alice@example.com");

    let by_email = repo
        .get_client_by_email(&Email::new("ALICE@example.com").unwrap())
        .unwrap();
    assert_eq!(by_email.map(|c| c.id), Some(created.id));

    let (total, items) = repo.list_clients(None).unwrap();
    assert_eq!(total, 1);
    assert_eq!(items.len(), 1);

    repo.set_client_customer_id(created.id, "cus_123").unwrap();
    let reloaded = repo.get_client_by_id(created.id).unwrap().unwrap();
    assert_eq!(reloaded.customer_id.as_deref(), Some("cus_123"));
}

#[test]
fn mediator_upsert_is_keyed_by_email() {
    let test_db = common::TestDb::new("repo_mediators.db");
    let repo = test_db.repo();

    let first = repo
        .create_or_update_mediator(&NewMediator {
            email: Email::new("jane@example.com").unwrap(),
            name: "Jane".to_string(),
        })
        .unwrap();
    let second = repo
        .create_or_update_mediator(&NewMediator {
            email: Email::new("jane@example.com").unwrap(),
            name: "Jane Doe".to_string(),
        })
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "Jane Doe");
}

#[test]
fn finance_profile_lifecycle() {
    let test_db = common::TestDb::new("repo_profiles.db");
    let repo = test_db.repo();

    let mediator = repo
        .create_or_update_mediator(&NewMediator {
            email: Email::new("jane@example.com").unwrap(),
            name: "Jane".to_string(),
        })
        .unwrap();

    let profile = repo.ensure_finance_profile(mediator.id).unwrap();
    assert!(!profile.account_verified);
    // Idempotent.
    let again = repo.ensure_finance_profile(mediator.id).unwrap();
    assert_eq!(profile.id, again.id);

    repo.set_profile_deposit_account(mediator.id, "acct_1").unwrap();
    let updated = repo
        .set_deposit_account_state(
            "acct_1",
            DepositAccountState {
                charges_enabled: true,
                payouts_enabled: true,
                details_submitted: true,
            },
        )
        .unwrap();
    assert!(updated.account_verified);

    let by_account = repo.get_finance_profile_by_account("acct_1").unwrap();
    assert_eq!(by_account.map(|p| p.id), Some(profile.id));
}

#[test]
fn matter_listing_filters_and_searches() {
    let test_db = common::TestDb::new("repo_matters.db");
    let repo = test_db.repo();

    let mediator = repo
        .create_or_update_mediator(&NewMediator {
            email: Email::new("jane@example.com").unwrap(),
            name: "Jane".to_string(),
        })
        .unwrap();
    let client = repo.create_client(&new_client("alice@example.com", "Alice")).unwrap();

    let m1 = repo
        .create_matter(&new_matter(mediator.id, client.id, "MA-00001"))
        .unwrap();
    let mut m2 = new_matter(mediator.id, client.id, "MA-00002");
    m2.title = "Contract dispute".to_string();
    repo.create_matter(&m2).unwrap();

    let (total, _) = repo
        .list_matters(MatterListQuery::new().mediator(mediator.id))
        .unwrap();
    assert_eq!(total, 2);

    let (found, items) = repo
        .list_matters(MatterListQuery::new().search("Contract"))
        .unwrap();
    assert_eq!(found, 1);
    assert_eq!(items[0].title, "Contract dispute");

    let updated = repo.set_matter_status(m1.id, MatterStatus::Closed).unwrap();
    assert_eq!(updated.status, MatterStatus::Closed);
    let (open_total, _) = repo
        .list_matters(MatterListQuery::new().status(MatterStatus::Open))
        .unwrap();
    assert_eq!(open_total, 1);
}

#[test]
fn billing_items_attach_to_invoices() {
    let test_db = common::TestDb::new("repo_billing.db");
    let repo = test_db.repo();

    let mediator = repo
        .create_or_update_mediator(&NewMediator {
            email: Email::new("jane@example.com").unwrap(),
            name: "Jane".to_string(),
        })
        .unwrap();
    let client = repo.create_client(&new_client("alice@example.com", "Alice")).unwrap();
    let matter = repo
        .create_matter(&new_matter(mediator.id, client.id, "MA-00001"))
        .unwrap();

    let today = Utc::now().date_naive();
    let item = repo
        .create_billing_item(&NewBillingItem {
            matter_id: matter.id,
            client_id: client.id,
            mediator_id: mediator.id,
            description: "Preparation call".to_string(),
            kind: BillingKind::Time,
            work_date: today,
            time_spent_minutes: Some(60),
            hourly_rate_cents: Some(20000),
            rate_cents: None,
            quantity: None,
            total_cents: None,
            is_billable: true,
            currency: "usd".to_string(),
        })
        .unwrap();

    let (total, _) = repo
        .list_billing_items(BillingItemListQuery::new(matter.id))
        .unwrap();
    assert_eq!(total, 1);

    let invoice = repo
        .create_invoice(&accord_crm::domain::invoice::NewInvoice {
            matter_id: matter.id,
            client_id: client.id,
            mediator_id: mediator.id,
            title: "March".to_string(),
            note: None,
            period_start: today,
            period_end: today,
            due_date: None,
            tax_rate_bps: 0,
            email: None,
        })
        .unwrap();

    assert_eq!(repo.attach_billing_items(invoice.id, &[item.id]).unwrap(), 1);
    // Attaching again is a no-op thanks to the composite key.
    assert_eq!(repo.attach_billing_items(invoice.id, &[item.id]).unwrap(), 0);

    let attached = repo.list_invoice_items(invoice.id).unwrap();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].id, item.id);

    let invoices = repo.list_item_invoices(item.id).unwrap();
    assert_eq!(invoices.len(), 1);

    repo.detach_billing_item(invoice.id, item.id).unwrap();
    assert!(repo.list_invoice_items(invoice.id).unwrap().is_empty());
}

#[test]
fn processor_event_claims_are_idempotent() {
    let test_db = common::TestDb::new("repo_events.db");
    let repo = test_db.repo();

    assert!(repo.claim_event("evt_1", "invoice.payment_succeeded").unwrap());
    // Second delivery loses the claim.
    assert!(!repo.claim_event("evt_1", "invoice.payment_succeeded").unwrap());

    repo.record_event_result("evt_1", EventRecordStatus::Success, None)
        .unwrap();
    // A finished event stays claimed.
    assert!(!repo.claim_event("evt_1", "invoice.payment_succeeded").unwrap());

    // An errored event is released for redelivery.
    assert!(repo.claim_event("evt_2", "invoice.payment_failed").unwrap());
    repo.record_event_result("evt_2", EventRecordStatus::Error, Some("boom"))
        .unwrap();
    assert!(repo.claim_event("evt_2", "invoice.payment_failed").unwrap());

    let record = repo.get_event_record("evt_2").unwrap().unwrap();
    assert_eq!(record.status, EventRecordStatus::Processing);
}
