use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::subscription::{
    NewSubscription as DomainNewSubscription, PlanType, Subscription as DomainSubscription,
    SubscriptionStatus,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::subscriptions)]
/// Diesel model for [`crate::domain::subscription::Subscription`].
pub struct Subscription {
    pub id: i32,
    pub mediator_id: i32,
    pub processor_id: String,
    pub plan: String,
    pub status: String,
    pub current_period_end: Option<NaiveDateTime>,
    pub cancel_at_period_end: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::subscriptions)]
pub struct NewSubscription<'a> {
    pub mediator_id: i32,
    pub processor_id: &'a str,
    pub plan: &'a str,
    pub status: &'a str,
    pub current_period_end: Option<NaiveDateTime>,
}

impl From<Subscription> for DomainSubscription {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            mediator_id: s.mediator_id,
            processor_id: s.processor_id,
            plan: PlanType::from(s.plan.as_str()),
            status: SubscriptionStatus::from(s.status.as_str()),
            current_period_end: s.current_period_end,
            cancel_at_period_end: s.cancel_at_period_end,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewSubscription> for NewSubscription<'a> {
    fn from(s: &'a DomainNewSubscription) -> Self {
        Self {
            mediator_id: s.mediator_id,
            processor_id: s.processor_id.as_str(),
            plan: s.plan.as_str(),
            status: s.status.as_str(),
            current_period_end: s.current_period_end,
        }
    }
}
