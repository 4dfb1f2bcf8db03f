use actix_web::{HttpResponse, Responder, get, post, web};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::dto::{ErrorResponse, ListResponse};
use crate::forms::matters::{CreateMatterForm, MatterActionForm, MatterListParams};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::DieselRepository;
use crate::routes::{error_response, validation_response};
use crate::services::matters as matter_service;

#[get("/matters")]
pub async fn list_matters(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<MatterListParams>,
) -> impl Responder {
    let params = params.into_inner();
    let page = params.page.unwrap_or(1);
    match matter_service::list_matters(repo.get_ref(), &user, page, params.search) {
        Ok(page_data) => HttpResponse::Ok().json(ListResponse::new(
            page_data.matters,
            page_data.total,
            page,
            DEFAULT_ITEMS_PER_PAGE,
        )),
        Err(e) => error_response(e),
    }
}

#[post("/matters")]
pub async fn create_matter(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateMatterForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return validation_response(e);
    }

    match matter_service::create_matter(repo.get_ref(), &user, (&form).into()) {
        Ok(matter) => HttpResponse::Created().json(matter),
        Err(e) => error_response(e),
    }
}

#[get("/matters/{matter_id}")]
pub async fn get_matter(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    matter_id: web::Path<i32>,
) -> impl Responder {
    match matter_service::get_matter(repo.get_ref(), &user, matter_id.into_inner()) {
        Ok(matter) => HttpResponse::Ok().json(matter),
        Err(e) => error_response(e),
    }
}

#[post("/matters/{matter_id}/status")]
pub async fn transition_matter(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    matter_id: web::Path<i32>,
    web::Json(form): web::Json<MatterActionForm>,
) -> impl Responder {
    let Some(action) = form.parsed() else {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: format!("unknown action `{}`", form.action),
        });
    };

    match matter_service::transition_matter(repo.get_ref(), &user, matter_id.into_inner(), action)
    {
        Ok(matter) => HttpResponse::Ok().json(matter),
        Err(e) => error_response(e),
    }
}
