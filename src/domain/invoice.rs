use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::TransitionNotAllowed;
use crate::domain::billing_item::BillingItem;
use crate::domain::payment::PaymentState;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Created but not yet sent; fully editable.
    Draft,
    /// Finalized with the processor and sent to the client.
    Open,
    /// Open past its due date.
    Overdue,
    Paid,
    Voided,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Open => "open",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Voided => "voided",
        }
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for InvoiceStatus {
    fn from(s: &str) -> Self {
        match s {
            "open" => InvoiceStatus::Open,
            "overdue" => InvoiceStatus::Overdue,
            "paid" => InvoiceStatus::Paid,
            "voided" => InvoiceStatus::Voided,
            _ => InvoiceStatus::Draft,
        }
    }
}

/// An invoice: the amount a client owes for work on a matter over a billing
/// period. Carries two independent state axes: the invoice lifecycle
/// (`status`) and the current payment attempt (`payment_status`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: i32,
    pub matter_id: i32,
    pub client_id: i32,
    pub mediator_id: i32,
    pub title: String,
    pub note: Option<String>,
    /// Invoice number assigned by the processor on finalization.
    pub number: Option<String>,
    /// Invoice identifier at the processor.
    pub processor_id: Option<String>,
    pub status: InvoiceStatus,
    pub payment_status: PaymentState,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub due_date: Option<NaiveDate>,
    /// Tax rate in basis points (1% == 100).
    pub tax_rate_bps: i32,
    pub email: Option<String>,
    pub finalized_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Invoice {
    fn step(
        &mut self,
        target: InvoiceStatus,
        sources: &[InvoiceStatus],
    ) -> Result<(), TransitionNotAllowed> {
        if sources.contains(&self.status) {
            self.status = target;
            Ok(())
        } else {
            Err(TransitionNotAllowed {
                from: self.status.as_str(),
                to: target.as_str(),
            })
        }
    }

    /// `draft` -> `open`. Callers finalize with the processor first; this
    /// only advances local state.
    pub fn send(&mut self) -> Result<(), TransitionNotAllowed> {
        self.step(InvoiceStatus::Open, &[InvoiceStatus::Draft])
    }

    /// `open` -> `overdue`, driven by the maintenance sweep.
    pub fn mark_overdue(&mut self) -> Result<(), TransitionNotAllowed> {
        self.step(InvoiceStatus::Overdue, &[InvoiceStatus::Open])
    }

    /// `open`/`overdue` -> `paid`.
    pub fn pay(&mut self) -> Result<(), TransitionNotAllowed> {
        self.step(
            InvoiceStatus::Paid,
            &[InvoiceStatus::Open, InvoiceStatus::Overdue],
        )
    }

    /// `draft`/`open` -> `voided`.
    pub fn void(&mut self) -> Result<(), TransitionNotAllowed> {
        self.step(
            InvoiceStatus::Voided,
            &[InvoiceStatus::Draft, InvoiceStatus::Open],
        )
    }

    /// The invoice and its attached items may still be edited: no payment
    /// attempt has begun.
    pub fn available_for_editing(&self) -> bool {
        self.payment_status == PaymentState::NotStarted
            && matches!(self.status, InvoiceStatus::Draft | InvoiceStatus::Open)
    }

    /// Sum of fees over the billable attached items, before tax.
    pub fn fees_earned_cents(&self, items: &[BillingItem]) -> i64 {
        items
            .iter()
            .filter(|i| i.is_billable)
            .map(BillingItem::fee_cents)
            .sum()
    }

    /// Fees plus tax, rounded to the nearest cent.
    pub fn total_cents(&self, items: &[BillingItem]) -> i64 {
        let fees = self.fees_earned_cents(items);
        fees + (fees * i64::from(self.tax_rate_bps) + 5_000) / 10_000
    }

    /// Total minutes recorded across attached items.
    pub fn time_billed_minutes(&self, items: &[BillingItem]) -> i64 {
        items
            .iter()
            .filter_map(|i| i.time_spent_minutes)
            .map(i64::from)
            .sum()
    }

    /// Payment can begin: there is something to charge, the mediator's
    /// deposit account is verified, and the invoice has been sent.
    pub fn can_be_paid(&self, items: &[BillingItem], deposit_account_ready: bool) -> bool {
        self.fees_earned_cents(items) > 0
            && deposit_account_ready
            && matches!(self.status, InvoiceStatus::Open | InvoiceStatus::Overdue)
    }

    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| due < today)
    }
}

#[derive(Clone, Debug)]
pub struct NewInvoice {
    pub matter_id: i32,
    pub client_id: i32,
    pub mediator_id: i32,
    pub title: String,
    pub note: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub tax_rate_bps: i32,
    pub email: Option<String>,
}

/// One line of the invoice's audit trail, appended on every processor
/// round-trip.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InvoiceActivity {
    pub id: i32,
    pub invoice_id: i32,
    pub activity: String,
    pub created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing_item::BillingKind;
    use chrono::Utc;

    fn invoice(status: InvoiceStatus) -> Invoice {
        let now = Utc::now().naive_utc();
        Invoice {
            id: 1,
            matter_id: 1,
            client_id: 1,
            mediator_id: 1,
            title: "Estate Invoice".into(),
            note: None,
            number: None,
            processor_id: None,
            status,
            payment_status: PaymentState::NotStarted,
            period_start: now.date(),
            period_end: now.date(),
            due_date: None,
            tax_rate_bps: 0,
            email: None,
            finalized_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn time_item(minutes: i32, rate_cents: i64, billable: bool) -> BillingItem {
        let now = Utc::now().naive_utc();
        BillingItem {
            id: 1,
            matter_id: 1,
            client_id: 1,
            mediator_id: 1,
            description: "session".into(),
            kind: BillingKind::Time,
            work_date: now.date(),
            time_spent_minutes: Some(minutes),
            hourly_rate_cents: Some(rate_cents),
            rate_cents: None,
            quantity: None,
            total_cents: None,
            is_billable: billable,
            currency: "usd".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn lifecycle_happy_path() {
        let mut inv = invoice(InvoiceStatus::Draft);
        inv.send().unwrap();
        inv.mark_overdue().unwrap();
        inv.pay().unwrap();
        assert_eq!(inv.status, InvoiceStatus::Paid);
    }

    #[test]
    fn draft_cannot_be_paid_or_overdue() {
        let mut inv = invoice(InvoiceStatus::Draft);
        assert!(inv.pay().is_err());
        assert!(inv.mark_overdue().is_err());
        assert_eq!(inv.status, InvoiceStatus::Draft);
    }

    #[test]
    fn paid_invoice_cannot_be_voided() {
        let mut inv = invoice(InvoiceStatus::Paid);
        assert!(inv.void().is_err());
    }

    #[test]
    fn duplicate_pay_is_rejected() {
        let mut inv = invoice(InvoiceStatus::Open);
        inv.pay().unwrap();
        assert!(inv.pay().is_err());
    }

    #[test]
    fn non_billable_items_are_excluded_from_fees() {
        let inv = invoice(InvoiceStatus::Open);
        let items = vec![time_item(60, 10000, true), time_item(60, 10000, false)];
        assert_eq!(inv.fees_earned_cents(&items), 10000);
    }

    #[test]
    fn total_applies_tax_with_rounding() {
        let mut inv = invoice(InvoiceStatus::Open);
        inv.tax_rate_bps = 825; // 8.25%
        let items = vec![time_item(60, 10000, true)];
        // 10000 * 0.0825 = 825
        assert_eq!(inv.total_cents(&items), 10825);
    }

    #[test]
    fn editing_is_locked_once_payment_starts() {
        let mut inv = invoice(InvoiceStatus::Open);
        assert!(inv.available_for_editing());
        inv.payment_status = inv.payment_status.start().unwrap();
        assert!(!inv.available_for_editing());
    }

    #[test]
    fn can_be_paid_needs_fees_account_and_open_status() {
        let inv = invoice(InvoiceStatus::Open);
        let items = vec![time_item(60, 10000, true)];
        assert!(inv.can_be_paid(&items, true));
        assert!(!inv.can_be_paid(&items, false));
        assert!(!inv.can_be_paid(&[], true));
        assert!(!invoice(InvoiceStatus::Draft).can_be_paid(&items, true));
    }
}
