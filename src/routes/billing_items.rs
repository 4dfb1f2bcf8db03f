use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::dto::ListResponse;
use crate::forms::billing_items::{
    BillingItemListParams, CreateBillingItemForm, UpdateBillingItemForm,
};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::DieselRepository;
use crate::routes::{error_response, validation_response};
use crate::services::billing_items as billing_service;

#[get("/billing-items")]
pub async fn list_billing_items(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<BillingItemListParams>,
) -> impl Responder {
    let params = params.into_inner();
    let page = params.page.unwrap_or(1);
    let period = match (params.period_start, params.period_end) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => None,
    };

    match billing_service::list_billing_items(
        repo.get_ref(),
        &user,
        params.matter_id,
        page,
        period,
    ) {
        Ok((total, items)) => {
            HttpResponse::Ok().json(ListResponse::new(items, total, page, DEFAULT_ITEMS_PER_PAGE))
        }
        Err(e) => error_response(e),
    }
}

#[post("/billing-items")]
pub async fn create_billing_item(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateBillingItemForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return validation_response(e);
    }

    match billing_service::add_billing_item(repo.get_ref(), &user, form.matter_id, (&form).into())
    {
        Ok(item) => HttpResponse::Created().json(item),
        Err(e) => error_response(e),
    }
}

#[put("/billing-items/{item_id}")]
pub async fn update_billing_item(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    item_id: web::Path<i32>,
    web::Json(form): web::Json<UpdateBillingItemForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return validation_response(e);
    }

    match billing_service::update_billing_item(
        repo.get_ref(),
        &user,
        item_id.into_inner(),
        (&form).into(),
    ) {
        Ok(item) => HttpResponse::Ok().json(item),
        Err(e) => error_response(e),
    }
}

#[delete("/billing-items/{item_id}")]
pub async fn delete_billing_item(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    item_id: web::Path<i32>,
) -> impl Responder {
    match billing_service::delete_billing_item(repo.get_ref(), &user, item_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}
