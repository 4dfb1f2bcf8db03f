use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::payment::{
    NewPayment as DomainNewPayment, Payment as DomainPayment, PaymentState,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::payments)]
/// Diesel model for [`crate::domain::payment::Payment`].
pub struct Payment {
    pub id: i32,
    pub invoice_id: i32,
    pub payer_client_id: i32,
    pub recipient_mediator_id: i32,
    pub amount_cents: i64,
    pub description: String,
    pub status: String,
    pub intent_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::payments)]
pub struct NewPayment<'a> {
    pub invoice_id: i32,
    pub payer_client_id: i32,
    pub recipient_mediator_id: i32,
    pub amount_cents: i64,
    pub description: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::payments)]
pub struct PaymentStateChange<'a> {
    pub status: &'a str,
    pub intent_id: Option<Option<&'a str>>,
    pub updated_at: NaiveDateTime,
}

impl From<Payment> for DomainPayment {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            invoice_id: p.invoice_id,
            payer_client_id: p.payer_client_id,
            recipient_mediator_id: p.recipient_mediator_id,
            amount_cents: p.amount_cents,
            description: p.description,
            status: PaymentState::from(p.status.as_str()),
            intent_id: p.intent_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewPayment> for NewPayment<'a> {
    fn from(p: &'a DomainNewPayment) -> Self {
        Self {
            invoice_id: p.invoice_id,
            payer_client_id: p.payer_client_id,
            recipient_mediator_id: p.recipient_mediator_id,
            amount_cents: p.amount_cents,
            description: p.description.as_str(),
        }
    }
}

impl<'a> From<&'a DomainPayment> for PaymentStateChange<'a> {
    fn from(p: &'a DomainPayment) -> Self {
        Self {
            status: p.status.as_str(),
            intent_id: Some(p.intent_id.as_deref()),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}
