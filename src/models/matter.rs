use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::matter::{
    Matter as DomainMatter, MatterStatus, NewMatter as DomainNewMatter, RateType,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::matters)]
/// Diesel model for [`crate::domain::matter::Matter`].
pub struct Matter {
    pub id: i32,
    pub code: String,
    pub mediator_id: i32,
    pub client_id: i32,
    pub title: String,
    pub description: String,
    pub rate_type: String,
    pub rate_cents: i64,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::matters)]
pub struct NewMatter<'a> {
    pub code: &'a str,
    pub mediator_id: i32,
    pub client_id: i32,
    pub title: &'a str,
    pub description: &'a str,
    pub rate_type: &'a str,
    pub rate_cents: i64,
}

impl From<Matter> for DomainMatter {
    fn from(m: Matter) -> Self {
        Self {
            id: m.id,
            code: m.code,
            mediator_id: m.mediator_id,
            client_id: m.client_id,
            title: m.title,
            description: m.description,
            rate_type: RateType::from(m.rate_type.as_str()),
            rate_cents: m.rate_cents,
            status: MatterStatus::from(m.status.as_str()),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewMatter> for NewMatter<'a> {
    fn from(m: &'a DomainNewMatter) -> Self {
        Self {
            code: m.code.as_str(),
            mediator_id: m.mediator_id,
            client_id: m.client_id,
            title: m.title.as_str(),
            description: m.description.as_str(),
            rate_type: m.rate_type.as_str(),
            rate_cents: m.rate_cents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn matter_into_domain_parses_enums() {
        let now = Utc::now().naive_utc();
        let db = Matter {
            id: 7,
            code: "MA-0007".into(),
            mediator_id: 1,
            client_id: 2,
            title: "t".into(),
            description: String::new(),
            rate_type: "flat".into(),
            rate_cents: 100,
            status: "referral".into(),
            created_at: now,
            updated_at: now,
        };
        let domain: DomainMatter = db.into();
        assert_eq!(domain.rate_type, RateType::Flat);
        assert_eq!(domain.status, MatterStatus::Referral);
    }
}
