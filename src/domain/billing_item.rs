use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::TypeConstraintError;

/// Minimum chargeable time entry.
pub const MIN_TIME_ENTRY_MINUTES: i32 = 15;
/// A single entry may not exceed a full day.
pub const MAX_TIME_ENTRY_MINUTES: i32 = 24 * 60;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillingKind {
    /// Recorded time billed at an hourly rate.
    Time,
    /// Quantity of some unit at a unit rate.
    Expense,
    /// A fixed total.
    FlatFee,
}

impl BillingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BillingKind::Time => "time",
            BillingKind::Expense => "expense",
            BillingKind::FlatFee => "flat_fee",
        }
    }
}

impl Display for BillingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for BillingKind {
    fn from(s: &str) -> Self {
        match s {
            "expense" => BillingKind::Expense,
            "flat_fee" => BillingKind::FlatFee,
            _ => BillingKind::Time,
        }
    }
}

/// One unit of billed work on a matter: a time entry, an expense, or a flat
/// fee. All money amounts are integer cents.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BillingItem {
    pub id: i32,
    pub matter_id: i32,
    pub client_id: i32,
    pub mediator_id: i32,
    pub description: String,
    pub kind: BillingKind,
    /// Date the billed work was performed.
    pub work_date: NaiveDate,
    pub time_spent_minutes: Option<i32>,
    pub hourly_rate_cents: Option<i64>,
    pub rate_cents: Option<i64>,
    pub quantity: Option<i32>,
    pub total_cents: Option<i64>,
    pub is_billable: bool,
    pub currency: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl BillingItem {
    /// The charge this item contributes to an invoice, in cents.
    pub fn fee_cents(&self) -> i64 {
        match self.kind {
            BillingKind::Time => {
                let minutes = i64::from(self.time_spent_minutes.unwrap_or(0));
                let rate = self.hourly_rate_cents.unwrap_or(0);
                rate * minutes / 60
            }
            BillingKind::Expense => {
                let quantity = i64::from(self.quantity.unwrap_or(0));
                self.rate_cents.unwrap_or(0) * quantity
            }
            BillingKind::FlatFee => self.total_cents.unwrap_or(0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewBillingItem {
    pub matter_id: i32,
    pub client_id: i32,
    pub mediator_id: i32,
    pub description: String,
    pub kind: BillingKind,
    pub work_date: NaiveDate,
    pub time_spent_minutes: Option<i32>,
    pub hourly_rate_cents: Option<i64>,
    pub rate_cents: Option<i64>,
    pub quantity: Option<i32>,
    pub total_cents: Option<i64>,
    pub is_billable: bool,
    pub currency: String,
}

impl NewBillingItem {
    /// Validates the kind-specific fields: time entries need a duration
    /// within bounds and a rate, expenses need quantity and unit rate, flat
    /// fees need a total.
    pub fn validated(self) -> Result<Self, TypeConstraintError> {
        match self.kind {
            BillingKind::Time => {
                let minutes = self
                    .time_spent_minutes
                    .ok_or_else(|| missing("time_spent_minutes"))?;
                if !(MIN_TIME_ENTRY_MINUTES..=MAX_TIME_ENTRY_MINUTES).contains(&minutes) {
                    return Err(TypeConstraintError::InvalidValue(format!(
                        "time entry must be between {MIN_TIME_ENTRY_MINUTES} minutes and 24 hours, got {minutes}"
                    )));
                }
                self.hourly_rate_cents
                    .ok_or_else(|| missing("hourly_rate_cents"))?;
            }
            BillingKind::Expense => {
                self.rate_cents.ok_or_else(|| missing("rate_cents"))?;
                let quantity = self.quantity.ok_or_else(|| missing("quantity"))?;
                if quantity <= 0 {
                    return Err(TypeConstraintError::InvalidValue(
                        "quantity must be positive".into(),
                    ));
                }
            }
            BillingKind::FlatFee => {
                self.total_cents.ok_or_else(|| missing("total_cents"))?;
            }
        }
        if self.description.trim().is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(self)
    }
}

fn missing(field: &str) -> TypeConstraintError {
    TypeConstraintError::InvalidValue(format!("missing required field `{field}`"))
}

#[derive(Clone, Debug)]
pub struct UpdateBillingItem {
    pub description: String,
    pub work_date: NaiveDate,
    pub time_spent_minutes: Option<i32>,
    pub hourly_rate_cents: Option<i64>,
    pub rate_cents: Option<i64>,
    pub quantity: Option<i32>,
    pub total_cents: Option<i64>,
    pub is_billable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(kind: BillingKind) -> BillingItem {
        let now = Utc::now().naive_utc();
        BillingItem {
            id: 1,
            matter_id: 1,
            client_id: 1,
            mediator_id: 1,
            description: "work".into(),
            kind,
            work_date: now.date(),
            time_spent_minutes: None,
            hourly_rate_cents: None,
            rate_cents: None,
            quantity: None,
            total_cents: None,
            is_billable: true,
            currency: "usd".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn time_fee_is_rate_times_hours() {
        let mut i = item(BillingKind::Time);
        i.time_spent_minutes = Some(90);
        i.hourly_rate_cents = Some(20000);
        assert_eq!(i.fee_cents(), 30000);
    }

    #[test]
    fn expense_fee_is_rate_times_quantity() {
        let mut i = item(BillingKind::Expense);
        i.rate_cents = Some(1250);
        i.quantity = Some(4);
        assert_eq!(i.fee_cents(), 5000);
    }

    #[test]
    fn flat_fee_is_the_total() {
        let mut i = item(BillingKind::FlatFee);
        i.total_cents = Some(50000);
        assert_eq!(i.fee_cents(), 50000);
    }

    fn new_time_item(minutes: i32) -> NewBillingItem {
        NewBillingItem {
            matter_id: 1,
            client_id: 1,
            mediator_id: 1,
            description: "prep call".into(),
            kind: BillingKind::Time,
            work_date: Utc::now().date_naive(),
            time_spent_minutes: Some(minutes),
            hourly_rate_cents: Some(15000),
            rate_cents: None,
            quantity: None,
            total_cents: None,
            is_billable: true,
            currency: "usd".into(),
        }
    }

    #[test]
    fn time_entry_bounds_are_enforced() {
        assert!(new_time_item(14).validated().is_err());
        assert!(new_time_item(15).validated().is_ok());
        assert!(new_time_item(24 * 60).validated().is_ok());
        assert!(new_time_item(24 * 60 + 1).validated().is_err());
    }

    #[test]
    fn expense_requires_quantity_and_rate() {
        let mut i = new_time_item(60);
        i.kind = BillingKind::Expense;
        i.time_spent_minutes = None;
        i.hourly_rate_cents = None;
        assert!(i.clone().validated().is_err());
        i.rate_cents = Some(100);
        i.quantity = Some(0);
        assert!(i.clone().validated().is_err());
        i.quantity = Some(2);
        assert!(i.validated().is_ok());
    }
}
