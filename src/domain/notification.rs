use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationKind {
    InvoicePaid,
    InvoicePaymentFailed,
    InvoicePaymentCanceled,
    AccountVerified,
    AccountNeedsAttention,
    SubscriptionEnded,
    Other(String),
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::InvoicePaid => write!(f, "invoice_paid"),
            NotificationKind::InvoicePaymentFailed => write!(f, "invoice_payment_failed"),
            NotificationKind::InvoicePaymentCanceled => write!(f, "invoice_payment_canceled"),
            NotificationKind::AccountVerified => write!(f, "account_verified"),
            NotificationKind::AccountNeedsAttention => write!(f, "account_needs_attention"),
            NotificationKind::SubscriptionEnded => write!(f, "subscription_ended"),
            NotificationKind::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for NotificationKind {
    fn from(s: &str) -> Self {
        match s {
            "invoice_paid" => NotificationKind::InvoicePaid,
            "invoice_payment_failed" => NotificationKind::InvoicePaymentFailed,
            "invoice_payment_canceled" => NotificationKind::InvoicePaymentCanceled,
            "account_verified" => NotificationKind::AccountVerified,
            "account_needs_attention" => NotificationKind::AccountNeedsAttention,
            "subscription_ended" => NotificationKind::SubscriptionEnded,
            _ => NotificationKind::Other(s.to_string()),
        }
    }
}

/// An in-app notification delivered to a recipient's inbox.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: i32,
    pub recipient_email: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewNotification {
    pub recipient_email: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}
