#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod billing;
pub mod db;
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
pub mod models;
pub mod pagination;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

/// Role carried by practitioners who own matters and bill clients.
pub const ROLE_MEDIATOR: &str = "mediator";
/// Role carried by clients who pay invoices.
pub const ROLE_CLIENT: &str = "client";
/// Back-office role with unrestricted access.
pub const ROLE_ADMIN: &str = "admin";

#[cfg(feature = "server")]
use crate::billing::stripe::{PlanPrices, StripeGateway};
#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;
    let repo = DieselRepository::new(pool);

    let gateway = StripeGateway::new(
        &server_config.processor_secret_key,
        PlanPrices {
            standard: server_config.price_standard.clone(),
            premium: server_config.price_premium.clone(),
        },
    );

    let bind_address = (server_config.address.clone(), server_config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(routes::main::health)
            .service(
                web::scope("/api/v1")
                    .service(routes::clients::list_clients)
                    .service(routes::clients::register_client)
                    .service(routes::clients::get_client)
                    .service(routes::clients::update_client)
                    .service(routes::matters::list_matters)
                    .service(routes::matters::create_matter)
                    .service(routes::matters::get_matter)
                    .service(routes::matters::transition_matter)
                    .service(routes::billing_items::list_billing_items)
                    .service(routes::billing_items::create_billing_item)
                    .service(routes::billing_items::update_billing_item)
                    .service(routes::billing_items::delete_billing_item)
                    .service(routes::invoices::list_invoices)
                    .service(routes::invoices::upcoming_invoices)
                    .service(routes::invoices::export_invoices)
                    .service(routes::invoices::create_invoice)
                    .service(routes::invoices::get_invoice)
                    .service(routes::invoices::attach_items)
                    .service(routes::invoices::detach_item)
                    .service(routes::invoices::send_invoice)
                    .service(routes::invoices::pay_invoice)
                    .service(routes::invoices::void_invoice)
                    .service(routes::documents::list_folders)
                    .service(routes::documents::create_folder)
                    .service(routes::documents::delete_folder)
                    .service(routes::documents::list_documents)
                    .service(routes::documents::create_document)
                    .service(routes::documents::delete_document)
                    .service(routes::notifications::list_notifications)
                    .service(routes::notifications::mark_notification_read)
                    .service(routes::chats::list_chats)
                    .service(routes::chats::create_chat)
                    .service(routes::chats::list_messages)
                    .service(routes::chats::post_message)
                    .service(routes::subscriptions::subscribe)
                    .service(routes::subscriptions::current_subscription)
                    .service(routes::subscriptions::cancel_subscription)
                    .service(routes::subscriptions::resume_subscription)
                    .service(routes::subscriptions::deposit_onboarding)
                    .service(routes::webhooks::processor_webhook),
            )
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
