use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::TransitionNotAllowed;

/// Lifecycle of a single payment attempt, shared by [`Payment`] and the
/// invoice's `payment_status` axis.
///
/// `not_started` -> `in_progress` -> `paid`, with `failed` allowing a retry
/// and cancellation returning to `not_started` so the payer can start over.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    NotStarted,
    InProgress,
    Failed,
    Paid,
}

impl PaymentState {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentState::NotStarted => "not_started",
            PaymentState::InProgress => "in_progress",
            PaymentState::Failed => "failed",
            PaymentState::Paid => "paid",
        }
    }

    fn step(
        self,
        target: PaymentState,
        sources: &[PaymentState],
    ) -> Result<PaymentState, TransitionNotAllowed> {
        if sources.contains(&self) {
            Ok(target)
        } else {
            Err(TransitionNotAllowed {
                from: self.as_str(),
                to: target.as_str(),
            })
        }
    }

    /// The payer requested a payment intent (or is retrying after failure).
    pub fn start(self) -> Result<PaymentState, TransitionNotAllowed> {
        self.step(
            PaymentState::InProgress,
            &[PaymentState::NotStarted, PaymentState::Failed],
        )
    }

    /// The processor confirmed the charge.
    pub fn finalize(self) -> Result<PaymentState, TransitionNotAllowed> {
        self.step(PaymentState::Paid, &[PaymentState::InProgress])
    }

    /// The processor reported the charge failed. A failed payment can still
    /// be retried or canceled.
    pub fn fail(self) -> Result<PaymentState, TransitionNotAllowed> {
        self.step(PaymentState::Failed, &[PaymentState::InProgress])
    }

    /// The payer (or a maintenance sweep) abandoned the attempt.
    pub fn cancel(self) -> Result<PaymentState, TransitionNotAllowed> {
        self.step(
            PaymentState::NotStarted,
            &[PaymentState::InProgress, PaymentState::Failed],
        )
    }
}

impl Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for PaymentState {
    fn from(s: &str) -> Self {
        match s {
            "in_progress" => PaymentState::InProgress,
            "failed" => PaymentState::Failed,
            "paid" => PaymentState::Paid,
            _ => PaymentState::NotStarted,
        }
    }
}

/// Money moving from a client to a mediator's deposit account for one
/// invoice, tracked against the processor's payment intent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: i32,
    pub invoice_id: i32,
    pub payer_client_id: i32,
    pub recipient_mediator_id: i32,
    pub amount_cents: i64,
    pub description: String,
    pub status: PaymentState,
    /// Payment intent identifier at the processor, once one was created.
    pub intent_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewPayment {
    pub invoice_id: i32,
    pub payer_client_id: i32,
    pub recipient_mediator_id: i32,
    pub amount_cents: i64,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let s = PaymentState::NotStarted.start().unwrap();
        assert_eq!(s, PaymentState::InProgress);
        assert_eq!(s.finalize().unwrap(), PaymentState::Paid);
    }

    #[test]
    fn failed_payment_can_retry_or_cancel() {
        let failed = PaymentState::InProgress.fail().unwrap();
        assert_eq!(failed.start().unwrap(), PaymentState::InProgress);
        assert_eq!(failed.cancel().unwrap(), PaymentState::NotStarted);
    }

    #[test]
    fn paid_is_terminal() {
        assert!(PaymentState::Paid.start().is_err());
        assert!(PaymentState::Paid.fail().is_err());
        assert!(PaymentState::Paid.cancel().is_err());
    }

    #[test]
    fn cannot_finalize_before_start() {
        assert!(PaymentState::NotStarted.finalize().is_err());
    }
}
