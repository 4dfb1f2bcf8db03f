use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
/// Payload for creating a folder.
pub struct CreateFolderForm {
    #[validate(length(min = 1))]
    pub title: String,
    pub matter_id: Option<i32>,
    pub parent_id: Option<i32>,
}

#[derive(Deserialize, Validate)]
/// Payload for registering a stored document.
pub struct CreateDocumentForm {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(url)]
    pub url: String,
    pub matter_id: Option<i32>,
    pub folder_id: Option<i32>,
}

#[derive(Deserialize)]
/// Query parameters for document listings.
pub struct DocumentListParams {
    pub folder_id: Option<i32>,
}
