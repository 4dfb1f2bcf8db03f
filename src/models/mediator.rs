use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::mediator::{
    FinanceProfile as DomainFinanceProfile, Mediator as DomainMediator,
    NewMediator as DomainNewMediator,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::mediators)]
/// Diesel model for [`crate::domain::mediator::Mediator`].
pub struct Mediator {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub featured: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::mediators)]
pub struct NewMediator<'a> {
    pub email: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::finance_profiles)]
/// Diesel model for [`crate::domain::mediator::FinanceProfile`].
pub struct FinanceProfile {
    pub id: i32,
    pub mediator_id: i32,
    pub customer_id: Option<String>,
    pub deposit_account_id: Option<String>,
    pub account_verified: bool,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub was_promo_period_provided: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::finance_profiles)]
pub struct NewFinanceProfile {
    pub mediator_id: i32,
}

impl From<Mediator> for DomainMediator {
    fn from(m: Mediator) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
            featured: m.featured,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewMediator> for NewMediator<'a> {
    fn from(m: &'a DomainNewMediator) -> Self {
        Self {
            email: m.email.as_str(),
            name: m.name.as_str(),
        }
    }
}

impl From<FinanceProfile> for DomainFinanceProfile {
    fn from(p: FinanceProfile) -> Self {
        Self {
            id: p.id,
            mediator_id: p.mediator_id,
            customer_id: p.customer_id,
            deposit_account_id: p.deposit_account_id,
            account_verified: p.account_verified,
            charges_enabled: p.charges_enabled,
            payouts_enabled: p.payouts_enabled,
            was_promo_period_provided: p.was_promo_period_provided,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
