use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::services::invoices::CreateInvoice;

#[derive(Deserialize, Validate)]
/// Payload for creating (or fetching) the invoice for a billing period.
pub struct CreateInvoiceForm {
    pub matter_id: i32,
    pub title: Option<String>,
    pub note: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub due_date: Option<NaiveDate>,
    /// Tax rate in basis points (1% == 100).
    #[serde(default)]
    #[validate(range(min = 0, max = 10000))]
    pub tax_rate_bps: i32,
    #[validate(email)]
    pub email: Option<String>,
}

impl From<&CreateInvoiceForm> for CreateInvoice {
    fn from(form: &CreateInvoiceForm) -> Self {
        CreateInvoice {
            matter_id: form.matter_id,
            title: form.title.clone(),
            note: form.note.clone(),
            period_start: form.period_start,
            period_end: form.period_end,
            due_date: form.due_date,
            tax_rate_bps: form.tax_rate_bps,
            email: form.email.clone(),
        }
    }
}

#[derive(Deserialize)]
/// Payload attaching billing items to an invoice.
pub struct AttachItemsForm {
    pub billing_item_ids: Vec<i32>,
}

#[derive(Deserialize)]
/// Query parameters for invoice listings.
pub struct InvoiceListParams {
    pub page: Option<usize>,
    /// Comma-separated status filter, e.g. `open,overdue`.
    pub status: Option<String>,
}
