//! Repository implementation for folders and documents.

use diesel::prelude::*;

use crate::domain::document::{Document, Folder, NewDocument, NewFolder};
use crate::models::document::{
    Document as DbDocument, Folder as DbFolder, NewDocument as DbNewDocument,
    NewFolder as DbNewFolder,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, DocumentReader, DocumentWriter};

impl DocumentReader for DieselRepository {
    fn get_folder(&self, id: i32) -> RepositoryResult<Option<Folder>> {
        use crate::schema::folders;

        let mut conn = self.conn()?;
        let folder = folders::table
            .find(id)
            .first::<DbFolder>(&mut conn)
            .optional()?;

        Ok(folder.map(Into::into))
    }

    fn list_folders(&self, owner_email: &str) -> RepositoryResult<Vec<Folder>> {
        use crate::schema::folders;

        let mut conn = self.conn()?;
        let rows = folders::table
            .filter(folders::owner_email.eq(owner_email))
            .order(folders::title.asc())
            .load::<DbFolder>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(rows)
    }

    fn get_document(&self, id: i32) -> RepositoryResult<Option<Document>> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let document = documents::table
            .find(id)
            .first::<DbDocument>(&mut conn)
            .optional()?;

        Ok(document.map(Into::into))
    }

    fn list_documents(
        &self,
        owner_email: &str,
        folder_id: Option<i32>,
    ) -> RepositoryResult<Vec<Document>> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let mut query = documents::table
            .filter(documents::owner_email.eq(owner_email))
            .into_boxed();
        if let Some(folder_id) = folder_id {
            query = query.filter(documents::folder_id.eq(folder_id));
        }

        let rows = query
            .order(documents::title.asc())
            .load::<DbDocument>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(rows)
    }
}

impl DocumentWriter for DieselRepository {
    fn create_folder(&self, folder: &NewFolder) -> RepositoryResult<Folder> {
        use crate::schema::folders;

        let mut conn = self.conn()?;
        let insertable: DbNewFolder = folder.into();
        let created = diesel::insert_into(folders::table)
            .values(&insertable)
            .get_result::<DbFolder>(&mut conn)?;

        Ok(created.into())
    }

    fn delete_folder(&self, folder_id: i32) -> RepositoryResult<()> {
        use crate::schema::{documents, folders};

        let mut conn = self.conn()?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            // Documents in a removed folder fall back to the root listing.
            diesel::update(documents::table.filter(documents::folder_id.eq(folder_id)))
                .set(documents::folder_id.eq(None::<i32>))
                .execute(conn)?;
            diesel::delete(folders::table.find(folder_id)).execute(conn)?;
            Ok(())
        })?;

        Ok(())
    }

    fn create_document(&self, document: &NewDocument) -> RepositoryResult<Document> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let insertable: DbNewDocument = document.into();
        let created = diesel::insert_into(documents::table)
            .values(&insertable)
            .get_result::<DbDocument>(&mut conn)?;

        Ok(created.into())
    }

    fn delete_document(&self, document_id: i32) -> RepositoryResult<()> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        diesel::delete(documents::table.find(document_id)).execute(&mut conn)?;

        Ok(())
    }
}
