use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::client::{
    Client as DomainClient, NewClient as DomainNewClient, UpdateClient as DomainUpdateClient,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub customer_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
/// Insertable form of [`Client`].
pub struct NewClient<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub phone: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::clients)]
/// Data used when updating a [`Client`] record.
pub struct UpdateClient<'a> {
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl From<Client> for DomainClient {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            email: client.email,
            name: client.name,
            phone: client.phone,
            customer_id: client.customer_id,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewClient> for NewClient<'a> {
    fn from(client: &'a DomainNewClient) -> Self {
        Self {
            email: client.email.as_str(),
            name: client.name.as_str(),
            phone: client.phone.as_ref().map(|p| p.as_str()),
        }
    }
}

impl<'a> From<&'a DomainUpdateClient> for UpdateClient<'a> {
    fn from(update: &'a DomainUpdateClient) -> Self {
        Self {
            name: update.name.as_str(),
            phone: update.phone.as_ref().map(|p| p.as_str()),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}
