use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::document::{
    Document as DomainDocument, Folder as DomainFolder, NewDocument as DomainNewDocument,
    NewFolder as DomainNewFolder,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::folders)]
pub struct Folder {
    pub id: i32,
    pub owner_email: String,
    pub matter_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub title: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::folders)]
pub struct NewFolder<'a> {
    pub owner_email: &'a str,
    pub matter_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub title: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::documents)]
pub struct Document {
    pub id: i32,
    pub owner_email: String,
    pub matter_id: Option<i32>,
    pub folder_id: Option<i32>,
    pub title: String,
    pub url: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::documents)]
pub struct NewDocument<'a> {
    pub owner_email: &'a str,
    pub matter_id: Option<i32>,
    pub folder_id: Option<i32>,
    pub title: &'a str,
    pub url: &'a str,
}

impl From<Folder> for DomainFolder {
    fn from(f: Folder) -> Self {
        Self {
            id: f.id,
            owner_email: f.owner_email,
            matter_id: f.matter_id,
            parent_id: f.parent_id,
            title: f.title,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewFolder> for NewFolder<'a> {
    fn from(f: &'a DomainNewFolder) -> Self {
        Self {
            owner_email: f.owner_email.as_str(),
            matter_id: f.matter_id,
            parent_id: f.parent_id,
            title: f.title.as_str(),
        }
    }
}

impl From<Document> for DomainDocument {
    fn from(d: Document) -> Self {
        Self {
            id: d.id,
            owner_email: d.owner_email,
            matter_id: d.matter_id,
            folder_id: d.folder_id,
            title: d.title,
            url: d.url,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewDocument> for NewDocument<'a> {
    fn from(d: &'a DomainNewDocument) -> Self {
        Self {
            owner_email: d.owner_email.as_str(),
            matter_id: d.matter_id,
            folder_id: d.folder_id,
            title: d.title.as_str(),
            url: d.url.as_str(),
        }
    }
}
