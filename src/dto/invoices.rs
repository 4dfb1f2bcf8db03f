use serde::Serialize;

use crate::domain::billing_item::BillingItem;
use crate::domain::invoice::{Invoice, InvoiceActivity};
use crate::services::invoices::{InvoiceDetails, PaymentStart};

#[derive(Serialize)]
/// Full invoice view: the record, its items, and the computed money fields.
pub struct InvoiceDetailsResponse {
    pub invoice: Invoice,
    pub items: Vec<BillingItem>,
    pub fees_earned_cents: i64,
    pub total_cents: i64,
    pub time_billed_minutes: i64,
    pub activities: Vec<InvoiceActivity>,
}

impl InvoiceDetailsResponse {
    pub fn new(details: InvoiceDetails, activities: Vec<InvoiceActivity>) -> Self {
        Self {
            invoice: details.invoice,
            items: details.items,
            fees_earned_cents: details.fees_earned_cents,
            total_cents: details.total_cents,
            time_billed_minutes: details.time_billed_minutes,
            activities,
        }
    }
}

#[derive(Serialize)]
/// Returned when a payment is started; the browser confirms the intent with
/// the client secret.
pub struct PaymentStartResponse {
    pub payment_id: i32,
    pub amount_cents: i64,
    pub client_secret: Option<String>,
}

impl From<PaymentStart> for PaymentStartResponse {
    fn from(start: PaymentStart) -> Self {
        Self {
            payment_id: start.payment.id,
            amount_cents: start.payment.amount_cents,
            client_secret: start.client_secret,
        }
    }
}
