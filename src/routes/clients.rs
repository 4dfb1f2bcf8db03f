use actix_web::{HttpResponse, Responder, get, post, put, web};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::dto::ListResponse;
use crate::forms::clients::{RegisterClientForm, UpdateClientForm};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::DieselRepository;
use crate::routes::{error_response, validation_response};
use crate::services::clients as client_service;

#[derive(serde::Deserialize)]
struct PageParams {
    page: Option<usize>,
}

#[get("/clients")]
pub async fn list_clients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<PageParams>,
) -> impl Responder {
    let page = params.page.unwrap_or(1);
    match client_service::list_clients(repo.get_ref(), &user, page) {
        Ok((total, items)) => {
            HttpResponse::Ok().json(ListResponse::new(items, total, page, DEFAULT_ITEMS_PER_PAGE))
        }
        Err(e) => error_response(e),
    }
}

#[post("/clients")]
pub async fn register_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<RegisterClientForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return validation_response(e);
    }
    let new_client = match (&form).try_into() {
        Ok(new_client) => new_client,
        Err(e) => return error_response(crate::services::ServiceError::from(e)),
    };

    match client_service::register_client(repo.get_ref(), &user, new_client) {
        Ok(client) => HttpResponse::Created().json(client),
        Err(e) => error_response(e),
    }
}

#[get("/clients/{client_id}")]
pub async fn get_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    client_id: web::Path<i32>,
) -> impl Responder {
    match client_service::get_client(repo.get_ref(), &user, client_id.into_inner()) {
        Ok(client) => HttpResponse::Ok().json(client),
        Err(e) => error_response(e),
    }
}

#[put("/clients/{client_id}")]
pub async fn update_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    client_id: web::Path<i32>,
    web::Json(form): web::Json<UpdateClientForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return validation_response(e);
    }
    let updates = match (&form).try_into() {
        Ok(updates) => updates,
        Err(e) => return error_response(crate::services::ServiceError::from(e)),
    };

    match client_service::update_client(repo.get_ref(), &user, client_id.into_inner(), updates) {
        Ok(client) => HttpResponse::Ok().json(client),
        Err(e) => error_response(e),
    }
}
