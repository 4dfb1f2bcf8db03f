use actix_web::{HttpResponse, Responder, delete, get, post, web};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::forms::documents::{CreateDocumentForm, CreateFolderForm, DocumentListParams};
use crate::repository::DieselRepository;
use crate::routes::{error_response, validation_response};
use crate::services::documents as document_service;

#[get("/folders")]
pub async fn list_folders(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match document_service::list_folders(repo.get_ref(), &user) {
        Ok(folders) => HttpResponse::Ok().json(folders),
        Err(e) => error_response(e),
    }
}

#[post("/folders")]
pub async fn create_folder(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateFolderForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return validation_response(e);
    }

    match document_service::create_folder(
        repo.get_ref(),
        &user,
        form.title,
        form.matter_id,
        form.parent_id,
    ) {
        Ok(folder) => HttpResponse::Created().json(folder),
        Err(e) => error_response(e),
    }
}

#[delete("/folders/{folder_id}")]
pub async fn delete_folder(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    folder_id: web::Path<i32>,
) -> impl Responder {
    match document_service::delete_folder(repo.get_ref(), &user, folder_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

#[get("/documents")]
pub async fn list_documents(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<DocumentListParams>,
) -> impl Responder {
    match document_service::list_documents(repo.get_ref(), &user, params.folder_id) {
        Ok(documents) => HttpResponse::Ok().json(documents),
        Err(e) => error_response(e),
    }
}

#[post("/documents")]
pub async fn create_document(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateDocumentForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return validation_response(e);
    }

    match document_service::add_document(
        repo.get_ref(),
        &user,
        form.title,
        form.url,
        form.matter_id,
        form.folder_id,
    ) {
        Ok(document) => HttpResponse::Created().json(document),
        Err(e) => error_response(e),
    }
}

#[delete("/documents/{document_id}")]
pub async fn delete_document(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    document_id: web::Path<i32>,
) -> impl Responder {
    match document_service::delete_document(repo.get_ref(), &user, document_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}
