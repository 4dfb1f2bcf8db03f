use chrono::{NaiveDate, Utc};

use crate::auth::{AuthenticatedUser, check_role};
use crate::billing::{InvoiceLine, PaymentGateway};
use crate::domain::billing_item::BillingItem;
use crate::domain::client::Client;
use crate::domain::invoice::{Invoice, InvoiceStatus, NewInvoice};
use crate::domain::payment::{NewPayment, Payment, PaymentState};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{
    BillingItemReader, ClientReader, ClientWriter, InvoiceListQuery, InvoiceReader,
    InvoiceWriter, MatterReader, MediatorReader, MediatorWriter, NotificationWriter,
    PaymentReader, PaymentWriter,
};
use crate::services::{ServiceError, ServiceResult, clients, matters, notifications};
use crate::{ROLE_ADMIN, ROLE_CLIENT, ROLE_MEDIATOR};

pub struct CreateInvoice {
    pub matter_id: i32,
    pub title: Option<String>,
    pub note: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub tax_rate_bps: i32,
    pub email: Option<String>,
}

/// Invoice plus everything needed to render it.
pub struct InvoiceDetails {
    pub invoice: Invoice,
    pub items: Vec<BillingItem>,
    pub fees_earned_cents: i64,
    pub total_cents: i64,
    pub time_billed_minutes: i64,
}

/// Gets or creates the invoice covering the matter and period. An existing
/// (non-voided) invoice for the same period is returned as-is.
pub fn create_invoice<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: CreateInvoice,
) -> ServiceResult<Invoice>
where
    R: InvoiceReader + InvoiceWriter + MatterReader + MediatorWriter + ClientReader + ?Sized,
{
    let matter = matters::get_matter(repo, user, params.matter_id)?;

    if !check_role(ROLE_MEDIATOR, &user.roles) && !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    if !matter.is_hourly_rated() {
        return Err(ServiceError::Validation(
            "invoices can only be created for hourly matters".to_string(),
        ));
    }
    if params.period_end < params.period_start {
        return Err(ServiceError::Validation(
            "invoice period end precedes its start".to_string(),
        ));
    }

    if let Some(existing) =
        repo.find_invoice_for_period(matter.id, params.period_start, params.period_end)?
    {
        return Ok(existing);
    }

    let client = repo
        .get_client_by_id(matter.client_id)?
        .ok_or(ServiceError::NotFound("client"))?;

    let new_invoice = NewInvoice {
        matter_id: matter.id,
        client_id: matter.client_id,
        mediator_id: matter.mediator_id,
        title: params
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("{} Invoice", matter.title)),
        note: params.note,
        period_start: params.period_start,
        period_end: params.period_end,
        due_date: params.due_date,
        tax_rate_bps: params.tax_rate_bps,
        email: params.email.or(Some(client.email)),
    };

    let invoice = repo.create_invoice(&new_invoice)?;
    repo.log_invoice_activity(invoice.id, "A draft invoice was created")?;

    Ok(invoice)
}

/// Attaches billing items, enforcing the attachment invariants: same
/// matter, work date inside the invoice period, and an editable invoice.
pub fn attach_billing_items<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    item_ids: &[i32],
) -> ServiceResult<usize>
where
    R: InvoiceReader
        + InvoiceWriter
        + BillingItemReader
        + MatterReader
        + MediatorWriter
        + ClientReader
        + ?Sized,
{
    let invoice = repo
        .get_invoice_by_id(invoice_id)?
        .ok_or(ServiceError::NotFound("invoice"))?;
    matters::get_matter(repo, user, invoice.matter_id)?;

    if !invoice.available_for_editing() {
        return Err(ServiceError::Conflict(
            "invoice is no longer editable".to_string(),
        ));
    }

    for &item_id in item_ids {
        let item = repo
            .get_billing_item(item_id)?
            .ok_or(ServiceError::NotFound("billing item"))?;
        if item.matter_id != invoice.matter_id {
            return Err(ServiceError::Validation(
                "billing item belongs to another matter".to_string(),
            ));
        }
        if item.work_date < invoice.period_start || item.work_date > invoice.period_end {
            return Err(ServiceError::Validation(
                "billing item date is outside the invoice period".to_string(),
            ));
        }
    }

    repo.attach_billing_items(invoice_id, item_ids)
        .map_err(ServiceError::from)
}

pub fn detach_billing_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    item_id: i32,
) -> ServiceResult<()>
where
    R: InvoiceReader + InvoiceWriter + MatterReader + MediatorWriter + ClientReader + ?Sized,
{
    let invoice = repo
        .get_invoice_by_id(invoice_id)?
        .ok_or(ServiceError::NotFound("invoice"))?;
    matters::get_matter(repo, user, invoice.matter_id)?;

    if !invoice.available_for_editing() {
        return Err(ServiceError::Conflict(
            "invoice is no longer editable".to_string(),
        ));
    }

    repo.detach_billing_item(invoice_id, item_id)
        .map_err(ServiceError::from)
}

pub fn get_invoice_details<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<InvoiceDetails>
where
    R: InvoiceReader + BillingItemReader + MatterReader + MediatorWriter + ClientReader + ?Sized,
{
    let invoice = repo
        .get_invoice_by_id(invoice_id)?
        .ok_or(ServiceError::NotFound("invoice"))?;
    matters::get_matter(repo, user, invoice.matter_id)?;

    let items = repo.list_invoice_items(invoice_id)?;
    let fees_earned_cents = invoice.fees_earned_cents(&items);
    let total_cents = invoice.total_cents(&items);
    let time_billed_minutes = invoice.time_billed_minutes(&items);

    Ok(InvoiceDetails {
        invoice,
        items,
        fees_earned_cents,
        total_cents,
        time_billed_minutes,
    })
}

pub fn list_invoices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    page: usize,
    statuses: Vec<InvoiceStatus>,
) -> ServiceResult<(usize, Vec<Invoice>)>
where
    R: InvoiceReader + MediatorWriter + ClientReader + ?Sized,
{
    let mut query = InvoiceListQuery::new()
        .statuses(&statuses)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if check_role(ROLE_MEDIATOR, &user.roles) {
        let mediator = clients::resolve_mediator(repo, user)?;
        query = query.mediator(mediator.id);
    } else if check_role(ROLE_CLIENT, &user.roles) {
        let client = clients::resolve_client(repo, user)?;
        query = query.client(client.id);
    } else if !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.list_invoices(query).map_err(ServiceError::from)
}

/// Upcoming invoices a client should settle: open or overdue ones.
pub fn client_upcoming_invoices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    page: usize,
) -> ServiceResult<(usize, Vec<Invoice>)>
where
    R: InvoiceReader + ClientReader + ?Sized,
{
    let client = clients::resolve_client(repo, user)?;
    let query = InvoiceListQuery::new()
        .client(client.id)
        .statuses(&[InvoiceStatus::Open, InvoiceStatus::Overdue])
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);

    repo.list_invoices(query).map_err(ServiceError::from)
}

/// The processor customer record for a client, created on first use.
async fn ensure_client_customer<R, G>(
    repo: &R,
    gateway: &G,
    client: &Client,
) -> ServiceResult<String>
where
    R: ClientWriter + ?Sized,
    G: PaymentGateway,
{
    if let Some(customer_id) = &client.customer_id {
        return Ok(customer_id.clone());
    }
    let customer = gateway.create_customer(&client.email, &client.name).await?;
    repo.set_client_customer_id(client.id, &customer.id)?;

    Ok(customer.id)
}

fn dollars(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

/// Sends the invoice: creates and finalizes it with the processor, then
/// advances local state. A processor failure is recorded on the activity
/// trail and leaves the invoice in `draft`.
pub async fn send_invoice<R, G>(
    repo: &R,
    gateway: &G,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<Invoice>
where
    R: InvoiceReader
        + InvoiceWriter
        + BillingItemReader
        + MatterReader
        + MediatorWriter
        + ClientReader
        + ClientWriter
        + ?Sized,
    G: PaymentGateway,
{
    let mut details = get_invoice_details(repo, user, invoice_id)?;

    if !check_role(ROLE_MEDIATOR, &user.roles) && !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    if details.invoice.status != InvoiceStatus::Draft {
        return Err(ServiceError::Conflict(
            "only draft invoices can be sent".to_string(),
        ));
    }
    if details.items.is_empty() {
        return Err(ServiceError::Validation(
            "invoice has no billing items".to_string(),
        ));
    }

    let client = repo
        .get_client_by_id(details.invoice.client_id)?
        .ok_or(ServiceError::NotFound("client"))?;
    let customer_id = ensure_client_customer(repo, gateway, &client).await?;

    let mut lines: Vec<InvoiceLine> = details
        .items
        .iter()
        .filter(|i| i.is_billable)
        .map(|i| InvoiceLine {
            description: i.description.clone(),
            amount_cents: i.fee_cents(),
        })
        .collect();
    let tax_cents = details.total_cents - details.fees_earned_cents;
    if tax_cents > 0 {
        lines.push(InvoiceLine {
            description: format!(
                "Tax ({}.{:02}%)",
                details.invoice.tax_rate_bps / 100,
                details.invoice.tax_rate_bps % 100
            ),
            amount_cents: tax_cents,
        });
    }

    let created = match gateway
        .create_invoice(&customer_id, &lines, details.invoice.due_date)
        .await
    {
        Ok(created) => created,
        Err(e) => {
            repo.log_invoice_activity(invoice_id, "Creating the processor invoice failed")?;
            return Err(e.into());
        }
    };
    repo.log_invoice_activity(
        invoice_id,
        &format!(
            "An invoice for ${} was created for {}",
            dollars(details.total_cents),
            client.email
        ),
    )?;

    let finalized = match gateway.finalize_invoice(&created.id).await {
        Ok(finalized) => finalized,
        Err(e) => {
            repo.log_invoice_activity(invoice_id, "Finalizing the processor invoice failed")?;
            return Err(e.into());
        }
    };

    details.invoice.send()?;
    details.invoice.processor_id = Some(finalized.id);
    details.invoice.number = finalized.number;
    details.invoice.finalized_at = Some(Utc::now().naive_utc());
    let saved = repo.save_invoice_state(&details.invoice)?;

    repo.log_invoice_activity(
        invoice_id,
        &format!(
            "A draft invoice for ${} to {} was finalized and sent",
            dollars(details.total_cents),
            client.email
        ),
    )?;

    Ok(saved)
}

/// Outcome of starting a payment: the intent secret the browser confirms.
pub struct PaymentStart {
    pub payment: Payment,
    pub client_secret: Option<String>,
}

/// Starts paying an invoice. Only the matter's client can pay, the
/// mediator's deposit account must be verified, and the invoice must be
/// open. Local state is persisted only after the processor accepted the
/// payment intent.
pub async fn start_invoice_payment<R, G>(
    repo: &R,
    gateway: &G,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<PaymentStart>
where
    R: InvoiceReader
        + InvoiceWriter
        + BillingItemReader
        + MatterReader
        + MediatorReader
        + MediatorWriter
        + ClientReader
        + ClientWriter
        + PaymentReader
        + PaymentWriter
        + ?Sized,
    G: PaymentGateway,
{
    let client = clients::resolve_client(repo, user)?;
    let mut invoice = repo
        .get_invoice_by_id(invoice_id)?
        .ok_or(ServiceError::NotFound("invoice"))?;

    if invoice.client_id != client.id {
        return Err(ServiceError::Unauthorized);
    }

    let items = repo.list_invoice_items(invoice_id)?;
    let profile = repo
        .get_finance_profile(invoice.mediator_id)?
        .ok_or(ServiceError::NotFound("deposit account"))?;

    if !invoice.can_be_paid(&items, profile.deposit_account_ready()) {
        return Err(ServiceError::Conflict(
            "invoice cannot be paid yet".to_string(),
        ));
    }

    let amount_cents = invoice.total_cents(&items);

    let mut payment = match repo.get_payment_for_invoice(invoice_id)? {
        Some(payment) if payment.status == PaymentState::Paid => {
            return Err(ServiceError::Conflict("invoice is already paid".to_string()));
        }
        Some(payment) if payment.status == PaymentState::InProgress => {
            return Err(ServiceError::Conflict(
                "a payment for this invoice is already in progress".to_string(),
            ));
        }
        Some(payment) => payment,
        None => repo.create_payment(&NewPayment {
            invoice_id,
            payer_client_id: invoice.client_id,
            recipient_mediator_id: invoice.mediator_id,
            amount_cents,
            description: format!("Payment for Invoice #{}-{}", invoice.id, invoice.title),
        })?,
    };

    payment.status = payment.status.start()?;
    invoice.payment_status = invoice.payment_status.start()?;

    // Once payment begins, the items belong to this invoice alone.
    repo.detach_items_from_other_invoices(invoice_id)?;

    let deposit_account_id = profile
        .deposit_account_id
        .clone()
        .ok_or(ServiceError::NotFound("deposit account"))?;
    let customer_id = ensure_client_customer(repo, gateway, &client).await?;

    let intent = gateway
        .create_payment_intent(
            &customer_id,
            payment.amount_cents,
            &deposit_account_id,
            &payment.description,
        )
        .await?;

    payment.intent_id = Some(intent.id);
    let payment = repo.save_payment_state(&payment)?;
    repo.save_invoice_state(&invoice)?;
    repo.log_invoice_activity(
        invoice_id,
        &format!("A payment of ${} was started", dollars(amount_cents)),
    )?;

    Ok(PaymentStart {
        payment,
        client_secret: intent.client_secret,
    })
}

/// Voids a draft or open invoice.
pub fn void_invoice<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<Invoice>
where
    R: InvoiceReader + InvoiceWriter + MatterReader + MediatorWriter + ClientReader + ?Sized,
{
    let mut invoice = repo
        .get_invoice_by_id(invoice_id)?
        .ok_or(ServiceError::NotFound("invoice"))?;
    matters::get_matter(repo, user, invoice.matter_id)?;

    if !check_role(ROLE_MEDIATOR, &user.roles) && !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    invoice.void()?;
    let saved = repo.save_invoice_state(&invoice)?;
    repo.log_invoice_activity(invoice_id, "The invoice was voided")?;

    Ok(saved)
}

/// Maintenance sweep: moves open invoices past their due date to `overdue`.
/// Returns how many were transitioned.
pub fn mark_overdue_invoices<R>(repo: &R, today: NaiveDate) -> ServiceResult<usize>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    let mut transitioned = 0;
    for mut invoice in repo.list_invoices_past_due(today)? {
        if !invoice.is_past_due(today) {
            continue;
        }
        match invoice.mark_overdue() {
            Ok(()) => {
                repo.save_invoice_state(&invoice)?;
                transitioned += 1;
            }
            Err(e) => {
                // The listing races with concurrent payment; skip quietly.
                log::debug!("Skipping invoice {}: {e}", invoice.id);
            }
        }
    }

    Ok(transitioned)
}

/// Maintenance sweep: cancels payments stuck in `failed` since before
/// `cutoff`, releasing their invoices for another attempt.
pub async fn cancel_stale_failed_payments<R, G>(
    repo: &R,
    gateway: &G,
    cutoff: chrono::NaiveDateTime,
) -> ServiceResult<usize>
where
    R: PaymentReader + PaymentWriter + InvoiceReader + InvoiceWriter + NotificationWriter + ?Sized,
    G: PaymentGateway,
{
    let mut canceled = 0;
    for mut payment in repo.list_stale_failed_payments(cutoff)? {
        if let Some(intent_id) = &payment.intent_id {
            // The intent may already be gone at the processor; local cleanup
            // still proceeds.
            if let Err(e) = gateway.cancel_payment_intent(intent_id).await {
                log::warn!("Failed to cancel payment intent {intent_id}: {e}");
            }
        }

        payment.status = payment.status.cancel()?;
        payment.intent_id = None;
        repo.save_payment_state(&payment)?;

        if let Some(mut invoice) = repo.get_invoice_by_id(payment.invoice_id)? {
            if let Ok(next) = invoice.payment_status.cancel() {
                invoice.payment_status = next;
                repo.save_invoice_state(&invoice)?;
            }
            notifications::notify_payment_canceled(repo, &invoice)?;
        }
        canceled += 1;
    }

    Ok(canceled)
}
