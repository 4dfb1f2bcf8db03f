use actix_web::{HttpRequest, HttpResponse, Responder, post, web};

use crate::billing::events::verify_and_normalize;
use crate::billing::stripe::StripeGateway;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::services::reconciliation;

/// Processor webhook endpoint. Unauthenticated; trust comes from the
/// signature check. Handler failures answer 500 so the processor
/// redelivers; everything else is acknowledged with 200.
#[post("/webhooks/processor")]
pub async fn processor_webhook(
    req: HttpRequest,
    body: web::Bytes,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<StripeGateway>,
    config: web::Data<ServerConfig>,
) -> impl Responder {
    let Some(signature) = req
        .headers()
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
    else {
        return HttpResponse::BadRequest().body("missing signature header");
    };

    let Ok(payload) = std::str::from_utf8(&body) else {
        return HttpResponse::BadRequest().body("invalid payload encoding");
    };

    let envelope =
        match verify_and_normalize(payload, signature, &config.processor_webhook_secret) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!("Rejected webhook delivery: {e}");
                return HttpResponse::BadRequest().body("signature verification failed");
            }
        };

    match reconciliation::apply_event(repo.get_ref(), gateway.get_ref(), &envelope).await {
        Ok(outcome) => {
            log::info!(
                "Processor event {} ({}): {outcome:?}",
                envelope.event_id,
                envelope.event_type
            );
            HttpResponse::Ok().json(serde_json::json!({ "received": true }))
        }
        Err(e) => {
            log::error!(
                "Processor event {} ({}) failed: {e}",
                envelope.event_id,
                envelope.event_type
            );
            HttpResponse::InternalServerError().finish()
        }
    }
}
