use actix_web::{HttpResponse, Responder, get, post, web};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::dto::ListResponse;
use crate::forms::chats::{CreateChatForm, MessageListParams, PostMessageForm};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::DieselRepository;
use crate::routes::{error_response, validation_response};
use crate::services::chats as chat_service;

#[get("/chats")]
pub async fn list_chats(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match chat_service::list_chats(repo.get_ref(), &user) {
        Ok(chats) => HttpResponse::Ok().json(chats),
        Err(e) => error_response(e),
    }
}

#[post("/chats")]
pub async fn create_chat(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateChatForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return validation_response(e);
    }

    match chat_service::create_chat(
        repo.get_ref(),
        &user,
        form.title,
        form.matter_id,
        form.participants,
    ) {
        Ok(chat) => HttpResponse::Created().json(chat),
        Err(e) => error_response(e),
    }
}

#[get("/chats/{chat_id}/messages")]
pub async fn list_messages(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    chat_id: web::Path<i32>,
    params: web::Query<MessageListParams>,
) -> impl Responder {
    let page = params.page.unwrap_or(1);
    match chat_service::list_messages(repo.get_ref(), &user, chat_id.into_inner(), page) {
        Ok((total, items)) => {
            HttpResponse::Ok().json(ListResponse::new(items, total, page, DEFAULT_ITEMS_PER_PAGE))
        }
        Err(e) => error_response(e),
    }
}

#[post("/chats/{chat_id}/messages")]
pub async fn post_message(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    chat_id: web::Path<i32>,
    web::Json(form): web::Json<PostMessageForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return validation_response(e);
    }

    match chat_service::post_message(repo.get_ref(), &user, chat_id.into_inner(), form.body) {
        Ok(message) => HttpResponse::Created().json(message),
        Err(e) => error_response(e),
    }
}
