//! Mock repository implementations for isolating services in tests.

use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;

use crate::domain::billing_item::{BillingItem, NewBillingItem, UpdateBillingItem};
use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::invoice::{Invoice, InvoiceActivity, NewInvoice};
use crate::domain::matter::{Matter, MatterStatus, NewMatter};
use crate::domain::mediator::{DepositAccountState, FinanceProfile, Mediator, NewMediator};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::payment::{NewPayment, Payment};
use crate::domain::processor_event::{EventRecordStatus, ProcessorEventRecord};
use crate::domain::subscription::{NewSubscription, Subscription, SubscriptionSync};
use crate::domain::types::Email;
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    BillingItemListQuery, BillingItemReader, BillingItemWriter, ClientReader, ClientWriter,
    InvoiceListQuery, InvoiceReader, InvoiceWriter, MatterListQuery, MatterReader, MatterWriter,
    MediatorReader, MediatorWriter, NotificationReader, NotificationWriter, Pagination,
    PaymentReader, PaymentWriter, ProcessorEventStore, SubscriptionReader, SubscriptionWriter,
};

mock! {
    pub Repository {}

    impl ClientReader for Repository {
        fn get_client_by_id(&self, id: i32) -> RepositoryResult<Option<Client>>;
        fn get_client_by_email(&self, email: &Email) -> RepositoryResult<Option<Client>>;
        fn list_clients(
            &self,
            pagination: Option<Pagination>,
        ) -> RepositoryResult<(usize, Vec<Client>)>;
    }

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
        fn update_client(&self, client_id: i32, updates: &UpdateClient) -> RepositoryResult<Client>;
        fn set_client_customer_id(&self, client_id: i32, customer_id: &str) -> RepositoryResult<()>;
    }

    impl MediatorReader for Repository {
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

    impl MediatorWriter for Repository {
        fn create_or_update_mediator(&self, new_mediator: &NewMediator) -> RepositoryResult<Mediator>;
        fn set_mediator_featured(&self, mediator_id: i32, featured: bool) -> RepositoryResult<()>;
        fn ensure_finance_profile(&self, mediator_id: i32) -> RepositoryResult<FinanceProfile>;
        fn set_profile_customer_id(&self, mediator_id: i32, customer_id: &str) -> RepositoryResult<()>;
        fn set_profile_deposit_account(
            &self,
            mediator_id: i32,
            deposit_account_id: &str,
        ) -> RepositoryResult<()>;
        fn set_deposit_account_state(
            &self,
            deposit_account_id: &str,
            state: DepositAccountState,
        ) -> RepositoryResult<FinanceProfile>;
        fn mark_promo_period_provided(&self, mediator_id: i32) -> RepositoryResult<()>;
    }

    impl MatterReader for Repository {
        fn get_matter_by_id(&self, id: i32) -> RepositoryResult<Option<Matter>>;
        fn list_matters(&self, query: MatterListQuery) -> RepositoryResult<(usize, Vec<Matter>)>;
    }

    impl MatterWriter for Repository {
        fn create_matter(&self, new_matter: &NewMatter) -> RepositoryResult<Matter>;
        fn set_matter_status(&self, matter_id: i32, status: MatterStatus) -> RepositoryResult<Matter>;
    }

    impl BillingItemReader for Repository {
        fn get_billing_item(&self, id: i32) -> RepositoryResult<Option<BillingItem>>;
        fn list_billing_items(
            &self,
            query: BillingItemListQuery,
        ) -> RepositoryResult<(usize, Vec<BillingItem>)>;
        fn list_invoice_items(&self, invoice_id: i32) -> RepositoryResult<Vec<BillingItem>>;
        fn list_item_invoices(&self, billing_item_id: i32) -> RepositoryResult<Vec<Invoice>>;
    }

    impl BillingItemWriter for Repository {
        fn create_billing_item(&self, item: &NewBillingItem) -> RepositoryResult<BillingItem>;
        fn update_billing_item(
            &self,
            item_id: i32,
            updates: &UpdateBillingItem,
        ) -> RepositoryResult<BillingItem>;
        fn delete_billing_item(&self, item_id: i32) -> RepositoryResult<()>;
    }

    impl InvoiceReader for Repository {
        fn get_invoice_by_id(&self, id: i32) -> RepositoryResult<Option<Invoice>>;
        fn get_invoice_by_processor_id(&self, processor_id: &str) -> RepositoryResult<Option<Invoice>>;
        fn find_invoice_for_period(
            &self,
            matter_id: i32,
            period_start: NaiveDate,
            period_end: NaiveDate,
        ) -> RepositoryResult<Option<Invoice>>;
        fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)>;
        fn list_invoices_past_due(&self, today: NaiveDate) -> RepositoryResult<Vec<Invoice>>;
        fn list_invoice_activities(&self, invoice_id: i32) -> RepositoryResult<Vec<InvoiceActivity>>;
    }

    impl InvoiceWriter for Repository {
        fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
        fn attach_billing_items(
            &self,
            invoice_id: i32,
            billing_item_ids: &[i32],
        ) -> RepositoryResult<usize>;
        fn detach_billing_item(&self, invoice_id: i32, billing_item_id: i32) -> RepositoryResult<()>;
        fn detach_items_from_other_invoices(&self, invoice_id: i32) -> RepositoryResult<usize>;
        fn save_invoice_state(&self, invoice: &Invoice) -> RepositoryResult<Invoice>;
        fn log_invoice_activity(&self, invoice_id: i32, activity: &str) -> RepositoryResult<()>;
    }

    impl PaymentReader for Repository {
        fn get_payment_by_id(&self, id: i32) -> RepositoryResult<Option<Payment>>;
        fn get_payment_by_intent(&self, intent_id: &str) -> RepositoryResult<Option<Payment>>;
        fn get_payment_for_invoice(&self, invoice_id: i32) -> RepositoryResult<Option<Payment>>;
        fn list_stale_failed_payments(&self, cutoff: NaiveDateTime) -> RepositoryResult<Vec<Payment>>;
    }

    impl PaymentWriter for Repository {
        fn create_payment(&self, new_payment: &NewPayment) -> RepositoryResult<Payment>;
        fn save_payment_state(&self, payment: &Payment) -> RepositoryResult<Payment>;
    }

    impl SubscriptionReader for Repository {
        fn get_subscription_by_processor_id(
            &self,
            processor_id: &str,
        ) -> RepositoryResult<Option<Subscription>>;
        fn get_current_subscription(&self, mediator_id: i32) -> RepositoryResult<Option<Subscription>>;
    }

    impl SubscriptionWriter for Repository {
        fn upsert_subscription(&self, sub: &NewSubscription) -> RepositoryResult<Subscription>;
        fn sync_subscription(
            &self,
            processor_id: &str,
            sync: &SubscriptionSync,
        ) -> RepositoryResult<Option<Subscription>>;
    }

    impl NotificationReader for Repository {
        fn list_notifications(
            &self,
            recipient_email: &str,
            pagination: Option<Pagination>,
        ) -> RepositoryResult<(usize, Vec<Notification>)>;
    }

    impl NotificationWriter for Repository {
        fn create_notification(&self, notification: &NewNotification) -> RepositoryResult<Notification>;
        fn mark_notification_read(
            &self,
            notification_id: i32,
            recipient_email: &str,
        ) -> RepositoryResult<()>;
    }

    impl ProcessorEventStore for Repository {
        fn claim_event(&self, event_id: &str, event_type: &str) -> RepositoryResult<bool>;
        fn record_event_result(
            &self,
            event_id: &str,
            status: EventRecordStatus,
            error: Option<&str>,
        ) -> RepositoryResult<()>;
        fn get_event_record(&self, event_id: &str) -> RepositoryResult<Option<ProcessorEventRecord>>;
    }
}
