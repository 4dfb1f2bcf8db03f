use actix_web::{HttpResponse, Responder, get, post, web};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::billing::stripe::StripeGateway;
use crate::domain::invoice::InvoiceStatus;
use crate::dto::ListResponse;
use crate::dto::invoices::{InvoiceDetailsResponse, PaymentStartResponse};
use crate::forms::invoices::{AttachItemsForm, CreateInvoiceForm, InvoiceListParams};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{DieselRepository, InvoiceReader};
use crate::routes::{error_response, validation_response};
use crate::services::invoices as invoice_service;

fn parse_statuses(raw: Option<&str>) -> Vec<InvoiceStatus> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(InvoiceStatus::from)
            .collect()
    })
    .unwrap_or_default()
}

#[get("/invoices")]
pub async fn list_invoices(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<InvoiceListParams>,
) -> impl Responder {
    let params = params.into_inner();
    let page = params.page.unwrap_or(1);
    let statuses = parse_statuses(params.status.as_deref());

    match invoice_service::list_invoices(repo.get_ref(), &user, page, statuses) {
        Ok((total, items)) => {
            HttpResponse::Ok().json(ListResponse::new(items, total, page, DEFAULT_ITEMS_PER_PAGE))
        }
        Err(e) => error_response(e),
    }
}

#[get("/invoices/upcoming")]
pub async fn upcoming_invoices(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<InvoiceListParams>,
) -> impl Responder {
    let page = params.page.unwrap_or(1);
    match invoice_service::client_upcoming_invoices(repo.get_ref(), &user, page) {
        Ok((total, items)) => {
            HttpResponse::Ok().json(ListResponse::new(items, total, page, DEFAULT_ITEMS_PER_PAGE))
        }
        Err(e) => error_response(e),
    }
}

#[get("/invoices/export")]
pub async fn export_invoices(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<InvoiceListParams>,
) -> impl Responder {
    let statuses = parse_statuses(params.status.as_deref());
    match crate::services::export::export_invoices_csv(repo.get_ref(), &user, statuses) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv")
            .insert_header((
                actix_web::http::header::CONTENT_DISPOSITION,
                "attachment; filename=\"invoices.csv\"",
            ))
            .body(csv),
        Err(e) => error_response(e),
    }
}

#[post("/invoices")]
pub async fn create_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<crate::models::config::ServerConfig>,
    web::Json(form): web::Json<CreateInvoiceForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return validation_response(e);
    }

    let mut params: crate::services::invoices::CreateInvoice = (&form).into();
    if params.due_date.is_none() {
        params.due_date =
            Some(params.period_end + chrono::Duration::days(i64::from(config.invoice_due_days)));
    }

    match invoice_service::create_invoice(repo.get_ref(), &user, params) {
        Ok(invoice) => HttpResponse::Created().json(invoice),
        Err(e) => error_response(e),
    }
}

#[get("/invoices/{invoice_id}")]
pub async fn get_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    invoice_id: web::Path<i32>,
) -> impl Responder {
    let invoice_id = invoice_id.into_inner();
    let details = match invoice_service::get_invoice_details(repo.get_ref(), &user, invoice_id) {
        Ok(details) => details,
        Err(e) => return error_response(e),
    };
    let activities = match repo.list_invoice_activities(invoice_id) {
        Ok(activities) => activities,
        Err(e) => {
            log::error!("Failed to load invoice activities: {e}");
            Vec::new()
        }
    };

    HttpResponse::Ok().json(InvoiceDetailsResponse::new(details, activities))
}

#[post("/invoices/{invoice_id}/items")]
pub async fn attach_items(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    invoice_id: web::Path<i32>,
    web::Json(form): web::Json<AttachItemsForm>,
) -> impl Responder {
    match invoice_service::attach_billing_items(
        repo.get_ref(),
        &user,
        invoice_id.into_inner(),
        &form.billing_item_ids,
    ) {
        Ok(attached) => HttpResponse::Ok().json(serde_json::json!({ "attached": attached })),
        Err(e) => error_response(e),
    }
}

#[post("/invoices/{invoice_id}/items/{item_id}/detach")]
pub async fn detach_item(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<(i32, i32)>,
) -> impl Responder {
    let (invoice_id, item_id) = path.into_inner();
    match invoice_service::detach_billing_item(repo.get_ref(), &user, invoice_id, item_id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

#[post("/invoices/{invoice_id}/send")]
pub async fn send_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<StripeGateway>,
    invoice_id: web::Path<i32>,
) -> impl Responder {
    match invoice_service::send_invoice(
        repo.get_ref(),
        gateway.get_ref(),
        &user,
        invoice_id.into_inner(),
    )
    .await
    {
        Ok(invoice) => HttpResponse::Ok().json(invoice),
        Err(e) => error_response(e),
    }
}

#[post("/invoices/{invoice_id}/pay")]
pub async fn pay_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<StripeGateway>,
    invoice_id: web::Path<i32>,
) -> impl Responder {
    match invoice_service::start_invoice_payment(
        repo.get_ref(),
        gateway.get_ref(),
        &user,
        invoice_id.into_inner(),
    )
    .await
    {
        Ok(start) => HttpResponse::Ok().json(PaymentStartResponse::from(start)),
        Err(e) => error_response(e),
    }
}

#[post("/invoices/{invoice_id}/void")]
pub async fn void_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    invoice_id: web::Path<i32>,
) -> impl Responder {
    match invoice_service::void_invoice(repo.get_ref(), &user, invoice_id.into_inner()) {
        Ok(invoice) => HttpResponse::Ok().json(invoice),
        Err(e) => error_response(e),
    }
}
