//! Reconciliation of processor webhook events against local state.
//!
//! Every event is claimed in `processor_events` before any mutation, making
//! redelivery idempotent. Handlers tolerate partial local state (deleted
//! users, unlinked payment intents) by skipping rather than failing, and
//! tolerate out-of-order delivery by funnelling every status change through
//! the domain state machines: an impossible transition is ignored, not
//! forced. Only a genuine handler failure is returned to the processor so
//! it redelivers.

use chrono::{Months, Utc};

use crate::billing::PaymentGateway;
use crate::domain::mediator::{DepositAccountState, FinanceProfile};
use crate::domain::processor_event::{
    BILLING_REASON_SUBSCRIPTION_CYCLE, EventRecordStatus, ProcessorEvent,
    ProcessorEventEnvelope,
};
use crate::domain::subscription::{
    PROMO_PERIOD_MONTHS, SubscriptionStatus, SubscriptionSync,
};
use crate::repository::{
    InvoiceReader, InvoiceWriter, MediatorReader, MediatorWriter, NotificationWriter,
    PaymentReader, PaymentWriter, ProcessorEventStore, SubscriptionReader, SubscriptionWriter,
};
use crate::services::{ServiceError, ServiceResult, notifications};

/// What happened to a delivered event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Local state was updated.
    Applied,
    /// The event id was already claimed by an earlier delivery.
    Duplicate,
    /// Acknowledged without effect (unhandled type or missing local
    /// counterpart).
    Skipped,
}

enum Disposition {
    Applied,
    Skipped(&'static str),
}

/// Applies one verified event envelope. Returns `Err` only when a handler
/// failed and the processor should redeliver.
pub async fn apply_event<R, G>(
    repo: &R,
    gateway: &G,
    envelope: &ProcessorEventEnvelope,
) -> ServiceResult<ReconcileOutcome>
where
    R: ProcessorEventStore
        + MediatorReader
        + MediatorWriter
        + SubscriptionReader
        + SubscriptionWriter
        + PaymentReader
        + PaymentWriter
        + InvoiceReader
        + InvoiceWriter
        + NotificationWriter
        + ?Sized,
    G: PaymentGateway,
{
    if !repo.claim_event(&envelope.event_id, &envelope.event_type)? {
        log::info!(
            "Duplicate processor event {} ({}), skipping",
            envelope.event_id,
            envelope.event_type
        );
        return Ok(ReconcileOutcome::Duplicate);
    }

    let Some(event) = &envelope.event else {
        log::info!(
            "Unhandled processor event type {} ({})",
            envelope.event_type,
            envelope.event_id
        );
        repo.record_event_result(&envelope.event_id, EventRecordStatus::Skipped, None)?;
        return Ok(ReconcileOutcome::Skipped);
    };

    match handle_event(repo, gateway, event).await {
        Ok(Disposition::Applied) => {
            repo.record_event_result(&envelope.event_id, EventRecordStatus::Success, None)?;
            Ok(ReconcileOutcome::Applied)
        }
        Ok(Disposition::Skipped(reason)) => {
            log::info!(
                "Processor event {} skipped: {reason}",
                envelope.event_id
            );
            repo.record_event_result(
                &envelope.event_id,
                EventRecordStatus::Skipped,
                Some(reason),
            )?;
            Ok(ReconcileOutcome::Skipped)
        }
        Err(err) => {
            log::error!(
                "Processing processor event {} failed: {err}",
                envelope.event_id
            );
            // Releasing the claim as `error` lets redelivery retry.
            if let Err(record_err) = repo.record_event_result(
                &envelope.event_id,
                EventRecordStatus::Error,
                Some(&err.to_string()),
            ) {
                log::error!(
                    "Failed to record error for event {}: {record_err}",
                    envelope.event_id
                );
            }
            Err(err)
        }
    }
}

async fn handle_event<R, G>(
    repo: &R,
    gateway: &G,
    event: &ProcessorEvent,
) -> ServiceResult<Disposition>
where
    R: MediatorReader
        + MediatorWriter
        + SubscriptionReader
        + SubscriptionWriter
        + PaymentReader
        + PaymentWriter
        + InvoiceReader
        + InvoiceWriter
        + NotificationWriter
        + ?Sized,
    G: PaymentGateway,
{
    match event {
        ProcessorEvent::SubscriptionInvoicePaid {
            customer_id,
            subscription_id,
            period_end,
        } => {
            let Some(profile) = repo.get_finance_profile_by_customer(customer_id)? else {
                return Ok(Disposition::Skipped("customer has no local profile"));
            };

            let Some(subscription_id) = subscription_id else {
                return Ok(Disposition::Skipped("invoice is not tied to a subscription"));
            };
            let Some(subscription) =
                repo.get_subscription_by_processor_id(subscription_id)?
            else {
                return Ok(Disposition::Skipped("subscription is not tracked locally"));
            };

            repo.sync_subscription(
                subscription_id,
                &SubscriptionSync {
                    status: SubscriptionStatus::Active,
                    current_period_end: (*period_end).or(subscription.current_period_end),
                    cancel_at_period_end: subscription.cancel_at_period_end,
                },
            )?;

            // Premium keeps the mediator featured in the directory.
            if subscription.plan.is_premium() {
                repo.set_mediator_featured(profile.mediator_id, true)?;
            }

            Ok(Disposition::Applied)
        }

        ProcessorEvent::SubscriptionPaymentFailed {
            customer_id,
            subscription_id,
            subscription_ended,
        } => {
            let profile = match customer_id {
                Some(customer_id) => repo.get_finance_profile_by_customer(customer_id)?,
                None => None,
            };
            // The user may have been deleted since the event was emitted.
            let Some(profile) = profile else {
                return Ok(Disposition::Skipped("customer has no local profile"));
            };

            repo.set_mediator_featured(profile.mediator_id, false)?;

            if let Some(subscription_id) = subscription_id {
                if let Some(subscription) =
                    repo.get_subscription_by_processor_id(subscription_id)?
                {
                    let status = if *subscription_ended {
                        SubscriptionStatus::Canceled
                    } else {
                        SubscriptionStatus::PastDue
                    };
                    repo.sync_subscription(
                        subscription_id,
                        &SubscriptionSync {
                            status,
                            current_period_end: subscription.current_period_end,
                            cancel_at_period_end: subscription.cancel_at_period_end,
                        },
                    )?;
                }
            }

            if *subscription_ended {
                if let Some(mediator) = repo.get_mediator_by_id(profile.mediator_id)? {
                    notifications::notify_subscription_ended(repo, &mediator.email)?;
                }
            }

            Ok(Disposition::Applied)
        }

        ProcessorEvent::SubscriptionInvoiceCreated {
            customer_id,
            subscription_id,
            billing_reason,
        } => {
            // The one-time promo period is granted when the first renewal
            // invoice appears, an hour before the charge.
            if billing_reason.as_deref() != Some(BILLING_REASON_SUBSCRIPTION_CYCLE) {
                return Ok(Disposition::Skipped("not a renewal invoice"));
            }
            let Some(profile) = repo.get_finance_profile_by_customer(customer_id)? else {
                return Ok(Disposition::Skipped("customer has no local profile"));
            };
            if profile.was_promo_period_provided {
                return Ok(Disposition::Skipped("promo period already granted"));
            }
            let Some(subscription_id) = subscription_id else {
                return Ok(Disposition::Skipped("invoice is not tied to a subscription"));
            };

            let until = Utc::now()
                .naive_utc()
                .checked_add_months(Months::new(PROMO_PERIOD_MONTHS))
                .ok_or_else(|| {
                    ServiceError::Internal("promo period end overflowed".to_string())
                })?;
            // Extend at the processor first: if this fails the promo flag
            // stays unset and redelivery retries.
            let updated = gateway.extend_trial(subscription_id, until).await?;
            repo.mark_promo_period_provided(profile.mediator_id)?;
            repo.sync_subscription(
                subscription_id,
                &SubscriptionSync {
                    status: updated.status,
                    current_period_end: updated.current_period_end,
                    cancel_at_period_end: updated.cancel_at_period_end,
                },
            )?;

            Ok(Disposition::Applied)
        }

        ProcessorEvent::SubscriptionSynced {
            subscription_id,
            customer_id,
            status,
            current_period_end,
            cancel_at_period_end,
        } => {
            let synced = repo.sync_subscription(
                subscription_id,
                &SubscriptionSync {
                    status: *status,
                    current_period_end: *current_period_end,
                    cancel_at_period_end: *cancel_at_period_end,
                },
            )?;
            if synced.is_none() {
                return Ok(Disposition::Skipped("subscription is not tracked locally"));
            }

            if !status.grants_access() {
                if let Some(profile) = repo.get_finance_profile_by_customer(customer_id)? {
                    repo.set_mediator_featured(profile.mediator_id, false)?;
                }
            }

            Ok(Disposition::Applied)
        }

        ProcessorEvent::PaymentIntentSucceeded { intent_id } => {
            apply_payment_transition(repo, intent_id, PaymentTransition::Finalize)
        }
        ProcessorEvent::PaymentIntentCanceled { intent_id } => {
            apply_payment_transition(repo, intent_id, PaymentTransition::Cancel)
        }
        ProcessorEvent::PaymentIntentFailed { intent_id } => {
            apply_payment_transition(repo, intent_id, PaymentTransition::Fail)
        }

        ProcessorEvent::AccountUpdated {
            account_id,
            charges_enabled,
            payouts_enabled,
            details_submitted,
        } => {
            if repo.get_finance_profile_by_account(account_id)?.is_none() {
                return Ok(Disposition::Skipped("account has no local profile"));
            }
            let profile = repo.set_deposit_account_state(
                account_id,
                DepositAccountState {
                    charges_enabled: *charges_enabled,
                    payouts_enabled: *payouts_enabled,
                    details_submitted: *details_submitted,
                },
            )?;
            notify_account_owner(repo, &profile)?;

            Ok(Disposition::Applied)
        }

        // The capability payload alone does not reflect the final account
        // state, so re-read the account from the processor.
        ProcessorEvent::CapabilityUpdated { account_id }
        | ProcessorEvent::ExternalAccountChanged { account_id } => {
            if repo.get_finance_profile_by_account(account_id)?.is_none() {
                return Ok(Disposition::Skipped("account has no local profile"));
            }
            let account = gateway.retrieve_deposit_account(account_id).await?;
            let profile = repo.set_deposit_account_state(account_id, account.state)?;
            notify_account_owner(repo, &profile)?;

            Ok(Disposition::Applied)
        }
    }
}

enum PaymentTransition {
    Finalize,
    Cancel,
    Fail,
}

/// Drives a payment (and its invoice) through the state machine for a
/// payment-intent event. A late or repeated event whose transition is no
/// longer legal is skipped, never forced.
fn apply_payment_transition<R>(
    repo: &R,
    intent_id: &str,
    transition: PaymentTransition,
) -> ServiceResult<Disposition>
where
    R: PaymentReader
        + PaymentWriter
        + InvoiceReader
        + InvoiceWriter
        + MediatorReader
        + NotificationWriter
        + ?Sized,
{
    let Some(mut payment) = repo.get_payment_by_intent(intent_id)? else {
        return Ok(Disposition::Skipped("intent is not linked to a payment"));
    };

    let next = match transition {
        PaymentTransition::Finalize => payment.status.finalize(),
        PaymentTransition::Cancel => payment.status.cancel(),
        PaymentTransition::Fail => payment.status.fail(),
    };
    let Ok(next) = next else {
        return Ok(Disposition::Skipped("transition not allowed in current state"));
    };
    payment.status = next;
    if matches!(transition, PaymentTransition::Cancel) {
        payment.intent_id = None;
    }
    repo.save_payment_state(&payment)?;

    let Some(mut invoice) = repo.get_invoice_by_id(payment.invoice_id)? else {
        return Ok(Disposition::Skipped("payment has no local invoice"));
    };

    match transition {
        PaymentTransition::Finalize => {
            if let Ok(s) = invoice.payment_status.finalize() {
                invoice.payment_status = s;
            }
            if let Err(e) = invoice.pay() {
                log::debug!("Invoice {} already settled: {e}", invoice.id);
            }
            repo.save_invoice_state(&invoice)?;
            repo.log_invoice_activity(
                invoice.id,
                &format!("The invoice was paid via payment intent {intent_id}"),
            )?;

            let mut recipients = Vec::new();
            if let Some(email) = invoice.email.clone() {
                recipients.push(email);
            }
            if let Some(mediator) = repo.get_mediator_by_id(invoice.mediator_id)? {
                recipients.push(mediator.email);
            }
            notifications::notify_invoice_paid(repo, &invoice, &recipients)?;
        }
        PaymentTransition::Cancel => {
            if let Ok(s) = invoice.payment_status.cancel() {
                invoice.payment_status = s;
                repo.save_invoice_state(&invoice)?;
            }
            notifications::notify_payment_canceled(repo, &invoice)?;
        }
        PaymentTransition::Fail => {
            if let Ok(s) = invoice.payment_status.fail() {
                invoice.payment_status = s;
                repo.save_invoice_state(&invoice)?;
            }
            notifications::notify_payment_failed(repo, &invoice)?;
        }
    }

    Ok(Disposition::Applied)
}

fn notify_account_owner<R>(repo: &R, profile: &FinanceProfile) -> ServiceResult<()>
where
    R: MediatorReader + NotificationWriter + ?Sized,
{
    if let Some(mediator) = repo.get_mediator_by_id(profile.mediator_id)? {
        notifications::notify_account_state(repo, &mediator.email, profile.account_verified)?;
    }

    Ok(())
}
