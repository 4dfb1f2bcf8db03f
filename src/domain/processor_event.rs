//! Normalized payment-processor webhook events.
//!
//! The gateway layer translates raw processor payloads into
//! [`ProcessorEvent`] values so the reconciliation service never touches the
//! vendor SDK and can be exercised with plain constructors in tests.

use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Billing reason attached to subscription invoices by the processor.
pub const BILLING_REASON_SUBSCRIPTION_CYCLE: &str = "subscription_cycle";

/// One event delivered by the processor, identified for idempotent
/// processing and carrying the normalized payload (if the type is handled).
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessorEventEnvelope {
    /// Processor-assigned event id, unique per delivery attempt group.
    pub event_id: String,
    /// Raw event type string, kept for the audit trail.
    pub event_type: String,
    /// Normalized payload, `None` for event types this system ignores.
    pub event: Option<ProcessorEvent>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProcessorEvent {
    /// A subscription invoice was paid: the subscriber keeps (or regains)
    /// access, premium plans mark the mediator featured.
    SubscriptionInvoicePaid {
        customer_id: String,
        subscription_id: Option<String>,
        period_end: Option<NaiveDateTime>,
    },
    /// A subscription invoice failed, requires action, or the subscription
    /// was deleted outright: access is revoked.
    SubscriptionPaymentFailed {
        customer_id: Option<String>,
        subscription_id: Option<String>,
        /// The subscription itself ended (as opposed to a failed renewal).
        subscription_ended: bool,
    },
    /// A renewal invoice was created an hour before the charge; carries the
    /// billing reason used to grant the one-time promo period.
    SubscriptionInvoiceCreated {
        customer_id: String,
        subscription_id: Option<String>,
        billing_reason: Option<String>,
    },
    /// The processor created or updated a subscription; mirror its state.
    SubscriptionSynced {
        subscription_id: String,
        customer_id: String,
        status: crate::domain::subscription::SubscriptionStatus,
        current_period_end: Option<NaiveDateTime>,
        cancel_at_period_end: bool,
    },
    /// An invoice payment intent changed state.
    PaymentIntentSucceeded { intent_id: String },
    PaymentIntentCanceled { intent_id: String },
    PaymentIntentFailed { intent_id: String },
    /// A connected deposit account was updated by the processor.
    AccountUpdated {
        account_id: String,
        charges_enabled: bool,
        payouts_enabled: bool,
        details_submitted: bool,
    },
    /// A capability on a connected account changed. The payload alone is
    /// not enough to know the account state, so handlers re-sync.
    CapabilityUpdated { account_id: String },
    /// External bank account added/updated/removed on a connected account.
    ExternalAccountChanged { account_id: String },
}

/// Processing outcome recorded on the idempotency claim row.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventRecordStatus {
    /// Claimed, handler still running.
    Processing,
    Success,
    Error,
    /// Acknowledged without local effect (unhandled type, missing local
    /// counterpart).
    Skipped,
}

impl EventRecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventRecordStatus::Processing => "processing",
            EventRecordStatus::Success => "success",
            EventRecordStatus::Error => "error",
            EventRecordStatus::Skipped => "skipped",
        }
    }
}

impl Display for EventRecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for EventRecordStatus {
    fn from(s: &str) -> Self {
        match s {
            "success" => EventRecordStatus::Success,
            "error" => EventRecordStatus::Error,
            "skipped" => EventRecordStatus::Skipped,
            _ => EventRecordStatus::Processing,
        }
    }
}

/// Audit row for one processed (or skipped) processor event.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProcessorEventRecord {
    pub id: i32,
    pub event_id: String,
    pub event_type: String,
    pub status: EventRecordStatus,
    pub error: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
