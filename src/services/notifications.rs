use crate::auth::AuthenticatedUser;
use crate::domain::invoice::Invoice;
use crate::domain::notification::{NewNotification, Notification, NotificationKind};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{NotificationReader, NotificationWriter, Pagination};
use crate::services::{ServiceError, ServiceResult};

pub fn list_notifications<R>(
    repo: &R,
    user: &AuthenticatedUser,
    page: usize,
) -> ServiceResult<(usize, Vec<Notification>)>
where
    R: NotificationReader + ?Sized,
{
    repo.list_notifications(
        &user.email.to_lowercase(),
        Some(Pagination {
            page,
            per_page: DEFAULT_ITEMS_PER_PAGE,
        }),
    )
    .map_err(ServiceError::from)
}

pub fn mark_read<R>(repo: &R, user: &AuthenticatedUser, notification_id: i32) -> ServiceResult<()>
where
    R: NotificationWriter + ?Sized,
{
    repo.mark_notification_read(notification_id, &user.email.to_lowercase())
        .map_err(ServiceError::from)
}

fn dispatch<R>(
    repo: &R,
    recipient_email: &str,
    kind: NotificationKind,
    title: String,
    body: String,
) -> ServiceResult<()>
where
    R: NotificationWriter + ?Sized,
{
    repo.create_notification(&NewNotification {
        recipient_email: recipient_email.to_string(),
        kind,
        title,
        body,
    })?;

    Ok(())
}

pub fn notify_invoice_paid<R>(
    repo: &R,
    invoice: &Invoice,
    recipients: &[String],
) -> ServiceResult<()>
where
    R: NotificationWriter + ?Sized,
{
    for recipient in recipients {
        dispatch(
            repo,
            recipient,
            NotificationKind::InvoicePaid,
            format!("Invoice \"{}\" was paid", invoice.title),
            format!(
                "The payment for invoice #{} covering {} to {} has completed.",
                invoice.id, invoice.period_start, invoice.period_end
            ),
        )?;
    }

    Ok(())
}

pub fn notify_payment_failed<R>(repo: &R, invoice: &Invoice) -> ServiceResult<()>
where
    R: NotificationWriter + ?Sized,
{
    let Some(email) = invoice.email.as_deref() else {
        return Ok(());
    };
    dispatch(
        repo,
        email,
        NotificationKind::InvoicePaymentFailed,
        format!("Payment for \"{}\" failed", invoice.title),
        "The payment could not be completed. You can retry from the invoice page.".to_string(),
    )
}

pub fn notify_payment_canceled<R>(repo: &R, invoice: &Invoice) -> ServiceResult<()>
where
    R: NotificationWriter + ?Sized,
{
    let Some(email) = invoice.email.as_deref() else {
        return Ok(());
    };
    dispatch(
        repo,
        email,
        NotificationKind::InvoicePaymentCanceled,
        format!("Payment for \"{}\" was canceled", invoice.title),
        "The payment attempt was canceled. The invoice is open again.".to_string(),
    )
}

pub fn notify_account_state<R>(
    repo: &R,
    recipient_email: &str,
    verified: bool,
) -> ServiceResult<()>
where
    R: NotificationWriter + ?Sized,
{
    if verified {
        dispatch(
            repo,
            recipient_email,
            NotificationKind::AccountVerified,
            "Your deposit account is verified".to_string(),
            "Clients can now pay invoices directly to your account.".to_string(),
        )
    } else {
        dispatch(
            repo,
            recipient_email,
            NotificationKind::AccountNeedsAttention,
            "Your deposit account needs attention".to_string(),
            "The payment processor requires more information before payouts can resume."
                .to_string(),
        )
    }
}

pub fn notify_subscription_ended<R>(repo: &R, recipient_email: &str) -> ServiceResult<()>
where
    R: NotificationWriter + ?Sized,
{
    dispatch(
        repo,
        recipient_email,
        NotificationKind::SubscriptionEnded,
        "Your subscription has ended".to_string(),
        "Access to paid features is disabled until a new subscription is started.".to_string(),
    )
}
