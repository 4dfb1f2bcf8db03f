//! CSV export of invoices and their billing items.

use crate::auth::{AuthenticatedUser, check_role};
use crate::domain::invoice::InvoiceStatus;
use crate::repository::{
    BillingItemReader, ClientReader, InvoiceListQuery, InvoiceReader, MediatorWriter,
};
use crate::services::{ServiceError, ServiceResult, clients};
use crate::{ROLE_ADMIN, ROLE_MEDIATOR};

/// Renders the caller's invoices (optionally filtered by status) as CSV.
pub fn export_invoices_csv<R>(
    repo: &R,
    user: &AuthenticatedUser,
    statuses: Vec<InvoiceStatus>,
) -> ServiceResult<Vec<u8>>
where
    R: InvoiceReader + BillingItemReader + MediatorWriter + ClientReader + ?Sized,
{
    let mut query = InvoiceListQuery::new().statuses(&statuses);
    if check_role(ROLE_MEDIATOR, &user.roles) {
        let mediator = clients::resolve_mediator(repo, user)?;
        query = query.mediator(mediator.id);
    } else if !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let (_, invoices) = repo.list_invoices(query)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "number",
            "title",
            "status",
            "period_start",
            "period_end",
            "due_date",
            "items",
            "time_billed_minutes",
            "fees_cents",
            "total_cents",
        ])
        .map_err(|e| ServiceError::Internal(e.to_string()))?;

    for invoice in invoices {
        let items = repo.list_invoice_items(invoice.id)?;
        writer
            .write_record([
                invoice.number.clone().unwrap_or_default(),
                invoice.title.clone(),
                invoice.status.to_string(),
                invoice.period_start.to_string(),
                invoice.period_end.to_string(),
                invoice
                    .due_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                items.len().to_string(),
                invoice.time_billed_minutes(&items).to_string(),
                invoice.fees_earned_cents(&items).to_string(),
                invoice.total_cents(&items).to_string(),
            ])
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ServiceError::Internal(e.to_string()))
}
