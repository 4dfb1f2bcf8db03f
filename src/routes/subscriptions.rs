use actix_web::{HttpResponse, Responder, get, post, web};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::billing::stripe::StripeGateway;
use crate::forms::subscriptions::{OnboardingForm, SubscribeForm};
use crate::repository::DieselRepository;
use crate::routes::{error_response, validation_response};
use crate::services::subscriptions as subscription_service;

#[post("/subscriptions")]
pub async fn subscribe(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<StripeGateway>,
    web::Json(form): web::Json<SubscribeForm>,
) -> impl Responder {
    match subscription_service::subscribe(
        repo.get_ref(),
        gateway.get_ref(),
        &user,
        form.plan_type(),
    )
    .await
    {
        Ok(subscription) => HttpResponse::Created().json(subscription),
        Err(e) => error_response(e),
    }
}

#[get("/subscriptions/current")]
pub async fn current_subscription(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match subscription_service::current_subscription(repo.get_ref(), &user) {
        Ok(subscription) => HttpResponse::Ok().json(subscription),
        Err(e) => error_response(e),
    }
}

#[post("/subscriptions/cancel")]
pub async fn cancel_subscription(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<StripeGateway>,
) -> impl Responder {
    match subscription_service::cancel_subscription(repo.get_ref(), gateway.get_ref(), &user)
        .await
    {
        Ok(subscription) => HttpResponse::Ok().json(subscription),
        Err(e) => error_response(e),
    }
}

#[post("/subscriptions/resume")]
pub async fn resume_subscription(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<StripeGateway>,
) -> impl Responder {
    match subscription_service::resume_subscription(repo.get_ref(), gateway.get_ref(), &user)
        .await
    {
        Ok(subscription) => HttpResponse::Ok().json(subscription),
        Err(e) => error_response(e),
    }
}

#[post("/deposits/onboarding")]
pub async fn deposit_onboarding(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<StripeGateway>,
    web::Json(form): web::Json<OnboardingForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return validation_response(e);
    }

    match subscription_service::deposit_onboarding_link(
        repo.get_ref(),
        gateway.get_ref(),
        &user,
        &form.refresh_url,
        &form.return_url,
    )
    .await
    {
        Ok(url) => HttpResponse::Ok().json(serde_json::json!({ "url": url })),
        Err(e) => error_response(e),
    }
}
