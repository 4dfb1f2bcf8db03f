//! Repository implementation for matters.

use diesel::prelude::*;

use crate::domain::matter::{Matter, MatterStatus, NewMatter};
use crate::models::matter::{Matter as DbMatter, NewMatter as DbNewMatter};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, MatterListQuery, MatterReader, MatterWriter};

impl MatterReader for DieselRepository {
    fn get_matter_by_id(&self, id: i32) -> RepositoryResult<Option<Matter>> {
        use crate::schema::matters;

        let mut conn = self.conn()?;
        let matter = matters::table
            .find(id)
            .first::<DbMatter>(&mut conn)
            .optional()?;

        Ok(matter.map(Into::into))
    }

    fn list_matters(&self, query: MatterListQuery) -> RepositoryResult<(usize, Vec<Matter>)> {
        use crate::schema::matters;

        let mut conn = self.conn()?;

        let build = || {
            let mut q = matters::table.into_boxed();
            if let Some(mediator_id) = query.mediator_id {
                q = q.filter(matters::mediator_id.eq(mediator_id));
            }
            if let Some(client_id) = query.client_id {
                q = q.filter(matters::client_id.eq(client_id));
            }
            if let Some(status) = query.status {
                q = q.filter(matters::status.eq(status.as_str()));
            }
            if let Some(term) = &query.search {
                let pattern = format!("%{term}%");
                q = q.filter(
                    matters::title
                        .like(pattern.clone())
                        .or(matters::code.like(pattern)),
                );
            }
            q
        };

        let total: i64 = build().count().get_result(&mut conn)?;

        let mut q = build().order(matters::id.asc());
        if let Some(p) = &query.pagination {
            let page = p.page.max(1) as i64;
            let per_page = p.per_page as i64;
            q = q.limit(per_page).offset((page - 1) * per_page);
        }

        let items = q
            .load::<DbMatter>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok((total as usize, items))
    }
}

impl MatterWriter for DieselRepository {
    fn create_matter(&self, new_matter: &NewMatter) -> RepositoryResult<Matter> {
        use crate::schema::matters;

        let mut conn = self.conn()?;
        let insertable: DbNewMatter = new_matter.into();
        let created = diesel::insert_into(matters::table)
            .values(&insertable)
            .get_result::<DbMatter>(&mut conn)?;

        Ok(created.into())
    }

    fn set_matter_status(&self, matter_id: i32, status: MatterStatus) -> RepositoryResult<Matter> {
        use crate::schema::matters;

        let mut conn = self.conn()?;
        let updated = diesel::update(matters::table.find(matter_id))
            .set((
                matters::status.eq(status.as_str()),
                matters::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result::<DbMatter>(&mut conn)?;

        Ok(updated.into())
    }
}
