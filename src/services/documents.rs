use crate::auth::AuthenticatedUser;
use crate::domain::document::{Document, Folder, NewDocument, NewFolder};
use crate::repository::{DocumentReader, DocumentWriter};
use crate::services::{ServiceError, ServiceResult};

fn caller_email(user: &AuthenticatedUser) -> String {
    user.email.to_lowercase()
}

pub fn create_folder<R>(
    repo: &R,
    user: &AuthenticatedUser,
    title: String,
    matter_id: Option<i32>,
    parent_id: Option<i32>,
) -> ServiceResult<Folder>
where
    R: DocumentReader + DocumentWriter + ?Sized,
{
    let owner_email = caller_email(user);

    if let Some(parent_id) = parent_id {
        let parent = repo
            .get_folder(parent_id)?
            .ok_or(ServiceError::NotFound("folder"))?;
        if parent.owner_email != owner_email {
            return Err(ServiceError::Unauthorized);
        }
    }

    repo.create_folder(&NewFolder {
        owner_email,
        matter_id,
        parent_id,
        title: title.trim().to_string(),
    })
    .map_err(ServiceError::from)
}

pub fn list_folders<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Folder>>
where
    R: DocumentReader + ?Sized,
{
    repo.list_folders(&caller_email(user))
        .map_err(ServiceError::from)
}

pub fn delete_folder<R>(repo: &R, user: &AuthenticatedUser, folder_id: i32) -> ServiceResult<()>
where
    R: DocumentReader + DocumentWriter + ?Sized,
{
    let folder = repo
        .get_folder(folder_id)?
        .ok_or(ServiceError::NotFound("folder"))?;
    if folder.owner_email != caller_email(user) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_folder(folder_id).map_err(ServiceError::from)
}

pub fn add_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    title: String,
    url: String,
    matter_id: Option<i32>,
    folder_id: Option<i32>,
) -> ServiceResult<Document>
where
    R: DocumentReader + DocumentWriter + ?Sized,
{
    let owner_email = caller_email(user);

    if let Some(folder_id) = folder_id {
        let folder = repo
            .get_folder(folder_id)?
            .ok_or(ServiceError::NotFound("folder"))?;
        if folder.owner_email != owner_email {
            return Err(ServiceError::Unauthorized);
        }
    }

    repo.create_document(&NewDocument {
        owner_email,
        matter_id,
        folder_id,
        title: title.trim().to_string(),
        url,
    })
    .map_err(ServiceError::from)
}

pub fn list_documents<R>(
    repo: &R,
    user: &AuthenticatedUser,
    folder_id: Option<i32>,
) -> ServiceResult<Vec<Document>>
where
    R: DocumentReader + ?Sized,
{
    repo.list_documents(&caller_email(user), folder_id)
        .map_err(ServiceError::from)
}

pub fn delete_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    document_id: i32,
) -> ServiceResult<()>
where
    R: DocumentReader + DocumentWriter + ?Sized,
{
    let document = repo
        .get_document(document_id)?
        .ok_or(ServiceError::NotFound("document"))?;
    if document.owner_email != caller_email(user) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_document(document_id).map_err(ServiceError::from)
}
