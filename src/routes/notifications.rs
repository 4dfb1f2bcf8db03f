use actix_web::{HttpResponse, Responder, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::dto::ListResponse;
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::notifications as notification_service;

#[derive(serde::Deserialize)]
struct PageParams {
    page: Option<usize>,
}

#[get("/notifications")]
pub async fn list_notifications(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<PageParams>,
) -> impl Responder {
    let page = params.page.unwrap_or(1);
    match notification_service::list_notifications(repo.get_ref(), &user, page) {
        Ok((total, items)) => {
            HttpResponse::Ok().json(ListResponse::new(items, total, page, DEFAULT_ITEMS_PER_PAGE))
        }
        Err(e) => error_response(e),
    }
}

#[post("/notifications/{notification_id}/read")]
pub async fn mark_notification_read(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notification_id: web::Path<i32>,
) -> impl Responder {
    match notification_service::mark_read(repo.get_ref(), &user, notification_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}
