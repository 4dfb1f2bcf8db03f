use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::billing_item::{
    BillingItem as DomainBillingItem, BillingKind, NewBillingItem as DomainNewBillingItem,
    UpdateBillingItem as DomainUpdateBillingItem,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::billing_items)]
/// Diesel model for [`crate::domain::billing_item::BillingItem`].
pub struct BillingItem {
    pub id: i32,
    pub matter_id: i32,
    pub client_id: i32,
    pub mediator_id: i32,
    pub description: String,
    pub item_type: String,
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

#[derive(Insertable)]
#[diesel(table_name = crate::schema::billing_items)]
pub struct NewBillingItem<'a> {
    pub matter_id: i32,
    pub client_id: i32,
    pub mediator_id: i32,
    pub description: &'a str,
    pub item_type: &'a str,
    pub work_date: NaiveDate,
    pub time_spent_minutes: Option<i32>,
    pub hourly_rate_cents: Option<i64>,
    pub rate_cents: Option<i64>,
    pub quantity: Option<i32>,
    pub total_cents: Option<i64>,
    pub is_billable: bool,
    pub currency: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::billing_items)]
pub struct UpdateBillingItem<'a> {
    pub description: &'a str,
    pub work_date: NaiveDate,
    pub time_spent_minutes: Option<Option<i32>>,
    pub hourly_rate_cents: Option<Option<i64>>,
    pub rate_cents: Option<Option<i64>>,
    pub quantity: Option<Option<i32>>,
    pub total_cents: Option<Option<i64>>,
    pub is_billable: bool,
    pub updated_at: NaiveDateTime,
}

impl From<BillingItem> for DomainBillingItem {
    fn from(i: BillingItem) -> Self {
        Self {
            id: i.id,
            matter_id: i.matter_id,
            client_id: i.client_id,
            mediator_id: i.mediator_id,
            description: i.description,
            kind: BillingKind::from(i.item_type.as_str()),
            work_date: i.work_date,
            time_spent_minutes: i.time_spent_minutes,
            hourly_rate_cents: i.hourly_rate_cents,
            rate_cents: i.rate_cents,
            quantity: i.quantity,
            total_cents: i.total_cents,
            is_billable: i.is_billable,
            currency: i.currency,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewBillingItem> for NewBillingItem<'a> {
    fn from(i: &'a DomainNewBillingItem) -> Self {
        Self {
            matter_id: i.matter_id,
            client_id: i.client_id,
            mediator_id: i.mediator_id,
            description: i.description.as_str(),
            item_type: i.kind.as_str(),
            work_date: i.work_date,
            time_spent_minutes: i.time_spent_minutes,
            hourly_rate_cents: i.hourly_rate_cents,
            rate_cents: i.rate_cents,
            quantity: i.quantity,
            total_cents: i.total_cents,
            is_billable: i.is_billable,
            currency: i.currency.as_str(),
        }
    }
}

impl<'a> From<&'a DomainUpdateBillingItem> for UpdateBillingItem<'a> {
    fn from(u: &'a DomainUpdateBillingItem) -> Self {
        Self {
            description: u.description.as_str(),
            work_date: u.work_date,
            time_spent_minutes: Some(u.time_spent_minutes),
            hourly_rate_cents: Some(u.hourly_rate_cents),
            rate_cents: Some(u.rate_cents),
            quantity: Some(u.quantity),
            total_cents: Some(u.total_cents),
            is_billable: u.is_billable,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}
