use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::billing_item::{BillingKind, NewBillingItem, UpdateBillingItem};

#[derive(Deserialize, Validate)]
/// Payload for recording a billing item on a matter.
pub struct CreateBillingItemForm {
    pub matter_id: i32,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub kind: Option<String>,
    pub work_date: NaiveDate,
    pub time_spent_minutes: Option<i32>,
    pub hourly_rate_cents: Option<i64>,
    pub rate_cents: Option<i64>,
    pub quantity: Option<i32>,
    pub total_cents: Option<i64>,
    #[serde(default = "default_true")]
    pub is_billable: bool,
    #[serde(default)]
    pub currency: Option<String>,
}

fn default_true() -> bool {
    true
}

impl From<&CreateBillingItemForm> for NewBillingItem {
    /// Ownership fields are overwritten by the service from the matter.
    fn from(form: &CreateBillingItemForm) -> Self {
        NewBillingItem {
            matter_id: form.matter_id,
            client_id: 0,
            mediator_id: 0,
            description: form.description.trim().to_string(),
            kind: form
                .kind
                .as_deref()
                .map(BillingKind::from)
                .unwrap_or(BillingKind::Time),
            work_date: form.work_date,
            time_spent_minutes: form.time_spent_minutes,
            hourly_rate_cents: form.hourly_rate_cents,
            rate_cents: form.rate_cents,
            quantity: form.quantity,
            total_cents: form.total_cents,
            is_billable: form.is_billable,
            currency: form.currency.clone().unwrap_or_else(|| "usd".to_string()),
        }
    }
}

#[derive(Deserialize, Validate)]
/// Payload for editing a billing item.
pub struct UpdateBillingItemForm {
    #[validate(length(min = 1))]
    pub description: String,
    pub work_date: NaiveDate,
    pub time_spent_minutes: Option<i32>,
    pub hourly_rate_cents: Option<i64>,
    pub rate_cents: Option<i64>,
    pub quantity: Option<i32>,
    pub total_cents: Option<i64>,
    pub is_billable: bool,
}

impl From<&UpdateBillingItemForm> for UpdateBillingItem {
    fn from(form: &UpdateBillingItemForm) -> Self {
        UpdateBillingItem {
            description: form.description.trim().to_string(),
            work_date: form.work_date,
            time_spent_minutes: form.time_spent_minutes,
            hourly_rate_cents: form.hourly_rate_cents,
            rate_cents: form.rate_cents,
            quantity: form.quantity,
            total_cents: form.total_cents,
            is_billable: form.is_billable,
        }
    }
}

#[derive(Deserialize)]
/// Query parameters for billing item listings.
pub struct BillingItemListParams {
    pub matter_id: i32,
    pub page: Option<usize>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}
