//! Webhook verification and translation of raw processor events into the
//! domain's [`ProcessorEventEnvelope`].

use stripe::{Customer, Event, EventObject, EventType, Expandable, Subscription, Webhook};

use crate::billing::stripe::{naive_from_timestamp, subscription_status};
use crate::billing::{GatewayError, GatewayResult};
use crate::domain::processor_event::{ProcessorEvent, ProcessorEventEnvelope};

/// Verifies the webhook signature and normalizes the event. Event types this
/// system does not handle come back with an empty payload so the caller can
/// still acknowledge and record them.
pub fn verify_and_normalize(
    payload: &str,
    signature: &str,
    webhook_secret: &str,
) -> GatewayResult<ProcessorEventEnvelope> {
    let event = Webhook::construct_event(payload, signature, webhook_secret)
        .map_err(|_| GatewayError::InvalidSignature)?;

    Ok(normalize_event(event))
}

fn customer_ref(exp: &Expandable<Customer>) -> String {
    match exp {
        Expandable::Id(id) => id.to_string(),
        Expandable::Object(customer) => customer.id.to_string(),
    }
}

fn subscription_ref(exp: &Expandable<Subscription>) -> String {
    match exp {
        Expandable::Id(id) => id.to_string(),
        Expandable::Object(subscription) => subscription.id.to_string(),
    }
}

pub fn normalize_event(event: Event) -> ProcessorEventEnvelope {
    let event_id = event.id.to_string();
    let event_type = event.type_.to_string();
    // Connect events carry the connected account at the envelope level.
    let connected_account = event.account.clone();

    let normalized = match event.type_ {
        EventType::InvoicePaymentSucceeded => match event.data.object {
            EventObject::Invoice(invoice) => {
                let customer_id = invoice.customer.as_ref().map(customer_ref);
                let subscription_id = invoice.subscription.as_ref().map(subscription_ref);
                customer_id.map(|customer_id| ProcessorEvent::SubscriptionInvoicePaid {
                    customer_id,
                    subscription_id,
                    period_end: None,
                })
            }
            _ => None,
        },

        EventType::InvoicePaymentFailed | EventType::InvoicePaymentActionRequired => {
            match event.data.object {
                EventObject::Invoice(invoice) => {
                    Some(ProcessorEvent::SubscriptionPaymentFailed {
                        customer_id: invoice.customer.as_ref().map(customer_ref),
                        subscription_id: invoice.subscription.as_ref().map(subscription_ref),
                        subscription_ended: false,
                    })
                }
                _ => None,
            }
        }

        EventType::CustomerSubscriptionDeleted => match event.data.object {
            EventObject::Subscription(subscription) => {
                Some(ProcessorEvent::SubscriptionPaymentFailed {
                    customer_id: Some(customer_ref(&subscription.customer)),
                    subscription_id: Some(subscription.id.to_string()),
                    subscription_ended: true,
                })
            }
            _ => None,
        },

        EventType::CustomerSubscriptionCreated | EventType::CustomerSubscriptionUpdated => {
            match event.data.object {
                EventObject::Subscription(subscription) => {
                    Some(ProcessorEvent::SubscriptionSynced {
                        subscription_id: subscription.id.to_string(),
                        customer_id: customer_ref(&subscription.customer),
                        status: subscription_status(subscription.status),
                        current_period_end: naive_from_timestamp(
                            subscription.current_period_end,
                        ),
                        cancel_at_period_end: subscription.cancel_at_period_end,
                    })
                }
                _ => None,
            }
        }

        EventType::InvoiceCreated => match event.data.object {
            EventObject::Invoice(invoice) => {
                let customer_id = invoice.customer.as_ref().map(customer_ref);
                let subscription_id = invoice.subscription.as_ref().map(subscription_ref);
                let billing_reason = invoice.billing_reason.as_ref().map(|r| r.to_string());
                customer_id.map(|customer_id| ProcessorEvent::SubscriptionInvoiceCreated {
                    customer_id,
                    subscription_id,
                    billing_reason,
                })
            }
            _ => None,
        },

        EventType::PaymentIntentSucceeded => match event.data.object {
            EventObject::PaymentIntent(intent) => Some(ProcessorEvent::PaymentIntentSucceeded {
                intent_id: intent.id.to_string(),
            }),
            _ => None,
        },

        EventType::PaymentIntentCanceled => match event.data.object {
            EventObject::PaymentIntent(intent) => Some(ProcessorEvent::PaymentIntentCanceled {
                intent_id: intent.id.to_string(),
            }),
            _ => None,
        },

        EventType::PaymentIntentPaymentFailed => match event.data.object {
            EventObject::PaymentIntent(intent) => Some(ProcessorEvent::PaymentIntentFailed {
                intent_id: intent.id.to_string(),
            }),
            _ => None,
        },

        EventType::AccountUpdated => match event.data.object {
            EventObject::Account(account) => Some(ProcessorEvent::AccountUpdated {
                account_id: account.id.to_string(),
                charges_enabled: account.charges_enabled.unwrap_or(false),
                payouts_enabled: account.payouts_enabled.unwrap_or(false),
                details_submitted: account.details_submitted.unwrap_or(false),
            }),
            _ => None,
        },

        // The capability payload alone cannot tell us the final account
        // state; the handler re-syncs from the processor instead.
        EventType::CapabilityUpdated => connected_account
            .map(|account_id| ProcessorEvent::CapabilityUpdated { account_id }),

        EventType::AccountExternalAccountCreated
        | EventType::AccountExternalAccountDeleted
        | EventType::AccountExternalAccountUpdated => connected_account
            .map(|account_id| ProcessorEvent::ExternalAccountChanged { account_id }),

        _ => None,
    };

    ProcessorEventEnvelope {
        event_id,
        event_type,
        event: normalized,
    }
}
