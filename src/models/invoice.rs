use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::invoice::{
    Invoice as DomainInvoice, InvoiceActivity as DomainInvoiceActivity, InvoiceStatus,
    NewInvoice as DomainNewInvoice,
};
use crate::domain::payment::PaymentState;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::invoices)]
/// Diesel model for [`crate::domain::invoice::Invoice`].
pub struct Invoice {
    pub id: i32,
    pub matter_id: i32,
    pub client_id: i32,
    pub mediator_id: i32,
    pub title: String,
    pub note: Option<String>,
    pub number: Option<String>,
    pub processor_id: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub tax_rate_bps: i32,
    pub email: Option<String>,
    pub finalized_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct NewInvoice<'a> {
    pub matter_id: i32,
    pub client_id: i32,
    pub mediator_id: i32,
    pub title: &'a str,
    pub note: Option<&'a str>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub tax_rate_bps: i32,
    pub email: Option<&'a str>,
}

/// Columns rewritten whenever local invoice state advances.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::invoices)]
pub struct InvoiceStateChange<'a> {
    pub status: &'a str,
    pub payment_status: &'a str,
    pub number: Option<Option<&'a str>>,
    pub processor_id: Option<Option<&'a str>>,
    pub finalized_at: Option<Option<NaiveDateTime>>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(table_name = crate::schema::invoice_items)]
#[diesel(belongs_to(Invoice, foreign_key = invoice_id))]
#[diesel(primary_key(invoice_id, billing_item_id))]
pub struct InvoiceItem {
    pub invoice_id: i32,
    pub billing_item_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoice_items)]
pub struct NewInvoiceItem {
    pub invoice_id: i32,
    pub billing_item_id: i32,
}

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::invoice_activities)]
pub struct InvoiceActivity {
    pub id: i32,
    pub invoice_id: i32,
    pub activity: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoice_activities)]
pub struct NewInvoiceActivity<'a> {
    pub invoice_id: i32,
    pub activity: &'a str,
}

impl From<Invoice> for DomainInvoice {
    fn from(i: Invoice) -> Self {
        Self {
            id: i.id,
            matter_id: i.matter_id,
            client_id: i.client_id,
            mediator_id: i.mediator_id,
            title: i.title,
            note: i.note,
            number: i.number,
            processor_id: i.processor_id,
            status: InvoiceStatus::from(i.status.as_str()),
            payment_status: PaymentState::from(i.payment_status.as_str()),
            period_start: i.period_start,
            period_end: i.period_end,
            due_date: i.due_date,
            tax_rate_bps: i.tax_rate_bps,
            email: i.email,
            finalized_at: i.finalized_at,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewInvoice> for NewInvoice<'a> {
    fn from(i: &'a DomainNewInvoice) -> Self {
        Self {
            matter_id: i.matter_id,
            client_id: i.client_id,
            mediator_id: i.mediator_id,
            title: i.title.as_str(),
            note: i.note.as_deref(),
            period_start: i.period_start,
            period_end: i.period_end,
            due_date: i.due_date,
            tax_rate_bps: i.tax_rate_bps,
            email: i.email.as_deref(),
        }
    }
}

impl<'a> From<&'a DomainInvoice> for InvoiceStateChange<'a> {
    /// Snapshot the mutable state of a domain invoice for persistence after
    /// a transition.
    fn from(i: &'a DomainInvoice) -> Self {
        Self {
            status: i.status.as_str(),
            payment_status: i.payment_status.as_str(),
            number: Some(i.number.as_deref()),
            processor_id: Some(i.processor_id.as_deref()),
            finalized_at: Some(i.finalized_at),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl From<InvoiceActivity> for DomainInvoiceActivity {
    fn from(a: InvoiceActivity) -> Self {
        Self {
            id: a.id,
            invoice_id: a.invoice_id,
            activity: a.activity,
            created_at: a.created_at,
        }
    }
}
