//! Actix route handlers for the JSON API.

use actix_web::HttpResponse;

use crate::dto::ErrorResponse;
use crate::services::ServiceError;

pub mod billing_items;
pub mod chats;
pub mod clients;
pub mod documents;
pub mod invoices;
pub mod main;
pub mod matters;
pub mod notifications;
pub mod subscriptions;
pub mod webhooks;

/// Maps a service error to the corresponding HTTP response.
pub fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Forbidden().json(ErrorResponse {
            error: "forbidden".to_string(),
        }),
        ServiceError::NotFound(what) => HttpResponse::NotFound().json(ErrorResponse {
            error: format!("{what} not found"),
        }),
        ServiceError::Validation(msg) => {
            HttpResponse::BadRequest().json(ErrorResponse { error: msg })
        }
        ServiceError::Conflict(msg) => {
            HttpResponse::Conflict().json(ErrorResponse { error: msg })
        }
        ServiceError::Gateway(msg) => {
            log::error!("Payment processor error: {msg}");
            HttpResponse::BadGateway().json(ErrorResponse {
                error: "payment processor error".to_string(),
            })
        }
        ServiceError::Internal(msg) => {
            log::error!("Internal error: {msg}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Maps form validation failures to a 400 with the first message.
pub fn validation_response(err: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: err.to_string(),
    })
}
