use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A folder grouping documents, optionally scoped to a matter and nested
/// under a parent folder.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    pub id: i32,
    pub owner_email: String,
    pub matter_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub title: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewFolder {
    pub owner_email: String,
    pub matter_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub title: String,
}

/// A stored document. The file itself lives in external storage; only the
/// URL is tracked here.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
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

#[derive(Clone, Debug)]
pub struct NewDocument {
    pub owner_email: String,
    pub matter_id: Option<i32>,
    pub folder_id: Option<i32>,
    pub title: String,
    pub url: String,
}
