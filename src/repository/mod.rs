//! Repository traits and the Diesel-backed implementation.
//!
//! Services depend on the narrow reader/writer traits so they can be tested
//! against mocks; the HTTP layer holds a single [`DieselRepository`] that
//! implements all of them.

use chrono::{NaiveDate, NaiveDateTime};

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::billing_item::{BillingItem, NewBillingItem, UpdateBillingItem};
use crate::domain::chat::{Chat, Message, NewChat, NewMessage};
use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::document::{Document, Folder, NewDocument, NewFolder};
use crate::domain::invoice::{Invoice, InvoiceActivity, NewInvoice};
use crate::domain::matter::{Matter, MatterStatus, NewMatter};
use crate::domain::mediator::{DepositAccountState, FinanceProfile, Mediator, NewMediator};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::payment::{NewPayment, Payment};
use crate::domain::processor_event::{EventRecordStatus, ProcessorEventRecord};
use crate::domain::subscription::{NewSubscription, Subscription, SubscriptionSync};
use crate::domain::types::Email;
use crate::repository::errors::RepositoryResult;

pub mod billing_item;
pub mod chat;
pub mod client;
pub mod document;
pub mod errors;
pub mod invoice;
pub mod matter;
pub mod mediator;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod notification;
pub mod processor_event;
pub mod subscription;

/// Diesel-backed repository over the shared connection pool.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MatterListQuery {
    pub mediator_id: Option<i32>,
    pub client_id: Option<i32>,
    pub status: Option<MatterStatus>,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl MatterListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mediator(mut self, id: i32) -> Self {
        self.mediator_id = Some(id);
        self
    }

    pub fn client(mut self, id: i32) -> Self {
        self.client_id = Some(id);
        self
    }

    pub fn status(mut self, status: MatterStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct BillingItemListQuery {
    pub matter_id: i32,
    pub period: Option<(NaiveDate, NaiveDate)>,
    pub billable_only: bool,
    pub pagination: Option<Pagination>,
}

impl BillingItemListQuery {
    pub fn new(matter_id: i32) -> Self {
        Self {
            matter_id,
            period: None,
            billable_only: false,
            pagination: None,
        }
    }

    pub fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period = Some((start, end));
        self
    }

    pub fn billable_only(mut self) -> Self {
        self.billable_only = true;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceListQuery {
    pub mediator_id: Option<i32>,
    pub client_id: Option<i32>,
    pub matter_id: Option<i32>,
    pub statuses: Vec<crate::domain::invoice::InvoiceStatus>,
    pub pagination: Option<Pagination>,
}

impl InvoiceListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mediator(mut self, id: i32) -> Self {
        self.mediator_id = Some(id);
        self
    }

    pub fn client(mut self, id: i32) -> Self {
        self.client_id = Some(id);
        self
    }

    pub fn matter(mut self, id: i32) -> Self {
        self.matter_id = Some(id);
        self
    }

    pub fn statuses(mut self, statuses: &[crate::domain::invoice::InvoiceStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait ClientReader {
    fn get_client_by_id(&self, id: i32) -> RepositoryResult<Option<Client>>;
    fn get_client_by_email(&self, email: &Email) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, pagination: Option<Pagination>)
    -> RepositoryResult<(usize, Vec<Client>)>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    fn update_client(&self, client_id: i32, updates: &UpdateClient) -> RepositoryResult<Client>;
    fn set_client_customer_id(&self, client_id: i32, customer_id: &str) -> RepositoryResult<()>;
}

pub trait MediatorReader {
    fn get_mediator_by_id(&self, id: i32) -> RepositoryResult<Option<Mediator>>;
    fn get_mediator_by_email(&self, email: &Email) -> RepositoryResult<Option<Mediator>>;
    fn get_finance_profile(&self, mediator_id: i32) -> RepositoryResult<Option<FinanceProfile>>;
    fn get_finance_profile_by_account(
        &self,
        deposit_account_id: &str,
    ) -> RepositoryResult<Option<FinanceProfile>>;
    fn get_finance_profile_by_customer(
        &self,
        customer_id: &str,
    ) -> RepositoryResult<Option<FinanceProfile>>;
}

pub trait MediatorWriter {
    /// Upserts the mediator keyed by email, refreshing the display name.
    fn create_or_update_mediator(&self, new_mediator: &NewMediator) -> RepositoryResult<Mediator>;
    fn set_mediator_featured(&self, mediator_id: i32, featured: bool) -> RepositoryResult<()>;
    /// Creates the finance profile row if the mediator does not have one.
    fn ensure_finance_profile(&self, mediator_id: i32) -> RepositoryResult<FinanceProfile>;
    fn set_profile_customer_id(&self, mediator_id: i32, customer_id: &str)
    -> RepositoryResult<()>;
    fn set_profile_deposit_account(
        &self,
        mediator_id: i32,
        deposit_account_id: &str,
    ) -> RepositoryResult<()>;
    /// Mirrors the processor's verification state onto the profile.
    fn set_deposit_account_state(
        &self,
        deposit_account_id: &str,
        state: DepositAccountState,
    ) -> RepositoryResult<FinanceProfile>;
    fn mark_promo_period_provided(&self, mediator_id: i32) -> RepositoryResult<()>;
}

pub trait MatterReader {
    fn get_matter_by_id(&self, id: i32) -> RepositoryResult<Option<Matter>>;
    fn list_matters(&self, query: MatterListQuery) -> RepositoryResult<(usize, Vec<Matter>)>;
}

pub trait MatterWriter {
    fn create_matter(&self, new_matter: &NewMatter) -> RepositoryResult<Matter>;
    fn set_matter_status(&self, matter_id: i32, status: MatterStatus) -> RepositoryResult<Matter>;
}

pub trait BillingItemReader {
    fn get_billing_item(&self, id: i32) -> RepositoryResult<Option<BillingItem>>;
    fn list_billing_items(
        &self,
        query: BillingItemListQuery,
    ) -> RepositoryResult<(usize, Vec<BillingItem>)>;
    /// Billing items attached to the given invoice.
    fn list_invoice_items(&self, invoice_id: i32) -> RepositoryResult<Vec<BillingItem>>;
    /// Invoices the given billing item is attached to.
    fn list_item_invoices(&self, billing_item_id: i32) -> RepositoryResult<Vec<Invoice>>;
}

pub trait BillingItemWriter {
    fn create_billing_item(&self, item: &NewBillingItem) -> RepositoryResult<BillingItem>;
    fn update_billing_item(
        &self,
        item_id: i32,
        updates: &UpdateBillingItem,
    ) -> RepositoryResult<BillingItem>;
    fn delete_billing_item(&self, item_id: i32) -> RepositoryResult<()>;
}

pub trait InvoiceReader {
    fn get_invoice_by_id(&self, id: i32) -> RepositoryResult<Option<Invoice>>;
    fn get_invoice_by_processor_id(&self, processor_id: &str)
    -> RepositoryResult<Option<Invoice>>;
    /// The invoice covering the given matter and period, if one exists.
    fn find_invoice_for_period(
        &self,
        matter_id: i32,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> RepositoryResult<Option<Invoice>>;
    fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)>;
    /// Open invoices whose due date is strictly before `today`.
    fn list_invoices_past_due(&self, today: NaiveDate) -> RepositoryResult<Vec<Invoice>>;
    fn list_invoice_activities(&self, invoice_id: i32)
    -> RepositoryResult<Vec<InvoiceActivity>>;
}

pub trait InvoiceWriter {
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
    fn attach_billing_items(
        &self,
        invoice_id: i32,
        billing_item_ids: &[i32],
    ) -> RepositoryResult<usize>;
    fn detach_billing_item(&self, invoice_id: i32, billing_item_id: i32) -> RepositoryResult<()>;
    /// Removes the invoice's items from every *other* invoice, run before a
    /// payment starts so an item cannot be charged twice.
    fn detach_items_from_other_invoices(&self, invoice_id: i32) -> RepositoryResult<usize>;
    /// Persists the mutable state columns of a domain invoice after a
    /// transition.
    fn save_invoice_state(&self, invoice: &Invoice) -> RepositoryResult<Invoice>;
    fn log_invoice_activity(&self, invoice_id: i32, activity: &str) -> RepositoryResult<()>;
}

pub trait PaymentReader {
    fn get_payment_by_id(&self, id: i32) -> RepositoryResult<Option<Payment>>;
    fn get_payment_by_intent(&self, intent_id: &str) -> RepositoryResult<Option<Payment>>;
    /// The most recent payment row for the invoice, if any.
    fn get_payment_for_invoice(&self, invoice_id: i32) -> RepositoryResult<Option<Payment>>;
    /// Payments stuck in `failed` since before `cutoff`.
    fn list_stale_failed_payments(&self, cutoff: NaiveDateTime) -> RepositoryResult<Vec<Payment>>;
}

pub trait PaymentWriter {
    fn create_payment(&self, new_payment: &NewPayment) -> RepositoryResult<Payment>;
    fn save_payment_state(&self, payment: &Payment) -> RepositoryResult<Payment>;
}

pub trait SubscriptionReader {
    fn get_subscription_by_processor_id(
        &self,
        processor_id: &str,
    ) -> RepositoryResult<Option<Subscription>>;
    /// The mediator's newest non-canceled subscription.
    fn get_current_subscription(&self, mediator_id: i32)
    -> RepositoryResult<Option<Subscription>>;
}

pub trait SubscriptionWriter {
    /// Inserts or refreshes the mirror row keyed by processor id.
    fn upsert_subscription(&self, sub: &NewSubscription) -> RepositoryResult<Subscription>;
    fn sync_subscription(
        &self,
        processor_id: &str,
        sync: &SubscriptionSync,
    ) -> RepositoryResult<Option<Subscription>>;
}

pub trait DocumentReader {
    fn get_folder(&self, id: i32) -> RepositoryResult<Option<Folder>>;
    fn list_folders(&self, owner_email: &str) -> RepositoryResult<Vec<Folder>>;
    fn get_document(&self, id: i32) -> RepositoryResult<Option<Document>>;
    fn list_documents(
        &self,
        owner_email: &str,
        folder_id: Option<i32>,
    ) -> RepositoryResult<Vec<Document>>;
}

pub trait DocumentWriter {
    fn create_folder(&self, folder: &NewFolder) -> RepositoryResult<Folder>;
    fn delete_folder(&self, folder_id: i32) -> RepositoryResult<()>;
    fn create_document(&self, document: &NewDocument) -> RepositoryResult<Document>;
    fn delete_document(&self, document_id: i32) -> RepositoryResult<()>;
}

pub trait NotificationReader {
    fn list_notifications(
        &self,
        recipient_email: &str,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<Notification>)>;
}

pub trait NotificationWriter {
    fn create_notification(&self, notification: &NewNotification)
    -> RepositoryResult<Notification>;
    fn mark_notification_read(
        &self,
        notification_id: i32,
        recipient_email: &str,
    ) -> RepositoryResult<()>;
}

pub trait ChatReader {
    fn get_chat(&self, id: i32) -> RepositoryResult<Option<Chat>>;
    fn list_chats(&self, participant_email: &str) -> RepositoryResult<Vec<Chat>>;
    fn is_chat_participant(&self, chat_id: i32, email: &str) -> RepositoryResult<bool>;
    fn list_messages(
        &self,
        chat_id: i32,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<Message>)>;
}

pub trait ChatWriter {
    fn create_chat(&self, new_chat: &NewChat) -> RepositoryResult<Chat>;
    fn create_message(&self, new_message: &NewMessage) -> RepositoryResult<Message>;
}

pub trait ProcessorEventStore {
    /// Atomically claims the event id for processing. Returns `false` when
    /// another delivery already holds or finished the claim; a previous
    /// claim that ended in `error` is re-claimed so redelivery can retry.
    fn claim_event(&self, event_id: &str, event_type: &str) -> RepositoryResult<bool>;
    /// Records the processing outcome on the claim row.
    fn record_event_result(
        &self,
        event_id: &str,
        status: EventRecordStatus,
        error: Option<&str>,
    ) -> RepositoryResult<()>;
    fn get_event_record(&self, event_id: &str) -> RepositoryResult<Option<ProcessorEventRecord>>;
}
