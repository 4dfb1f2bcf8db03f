use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;

use crate::repository::DieselRepository;

/// Process and database health. The database check acquires a pooled
/// connection, which also exercises the per-connection pragmas.
#[get("/health")]
pub async fn health(repo: web::Data<DieselRepository>) -> impl Responder {
    match repo.conn() {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "database": "ok",
        })),
        Err(e) => {
            log::error!("Health check failed: {e}");
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "degraded",
                "database": "unavailable",
            }))
        }
    }
}
