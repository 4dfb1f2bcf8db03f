//! Repository implementation for clients.

use diesel::prelude::*;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::types::Email;
use crate::models::client::{
    Client as DbClient, NewClient as DbNewClient, UpdateClient as DbUpdateClient,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{ClientReader, ClientWriter, DieselRepository, Pagination};

impl ClientReader for DieselRepository {
    fn get_client_by_id(&self, id: i32) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let client = clients::table
            .find(id)
            .first::<DbClient>(&mut conn)
            .optional()?;

        Ok(client.map(Into::into))
    }

    fn get_client_by_email(&self, email: &Email) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let client = clients::table
            .filter(clients::email.eq(email.as_str()))
            .first::<DbClient>(&mut conn)
            .optional()?;

        Ok(client.map(Into::into))
    }

    fn list_clients(
        &self,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<Client>)> {
        use crate::schema::clients;

        let mut conn = self.conn()?;

        let total: i64 = clients::table.count().get_result(&mut conn)?;

        let mut query = clients::table.order(clients::id.asc()).into_boxed();
        if let Some(p) = pagination {
            let page = p.page.max(1) as i64;
            let per_page = p.per_page as i64;
            query = query.limit(per_page).offset((page - 1) * per_page);
        }

        let items = query
            .load::<DbClient>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok((total as usize, items))
    }
}

impl ClientWriter for DieselRepository {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let insertable: DbNewClient = new_client.into();
        let created = diesel::insert_into(clients::table)
            .values(&insertable)
            .get_result::<DbClient>(&mut conn)?;

        Ok(created.into())
    }

    fn update_client(&self, client_id: i32, updates: &UpdateClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_updates: DbUpdateClient = updates.into();
        let updated = diesel::update(clients::table.find(client_id))
            .set(&db_updates)
            .get_result::<DbClient>(&mut conn)?;

        Ok(updated.into())
    }

    fn set_client_customer_id(&self, client_id: i32, customer_id: &str) -> RepositoryResult<()> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        diesel::update(clients::table.find(client_id))
            .set(clients::customer_id.eq(customer_id))
            .execute(&mut conn)?;

        Ok(())
    }
}
