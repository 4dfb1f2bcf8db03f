//! Periodic billing maintenance, run from cron.
//!
//! Moves open invoices past their due date to `overdue` and cancels
//! payments stuck in `failed` for more than a day, releasing their invoices
//! for another attempt.

use std::env;

use chrono::{Duration, Utc};
use config::{Config, Environment, File};
use dotenvy::dotenv;

use accord_crm::billing::stripe::{PlanPrices, StripeGateway};
use accord_crm::db::establish_connection_pool;
use accord_crm::models::config::ServerConfig;
use accord_crm::repository::DieselRepository;
use accord_crm::services::invoices;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config_path = env::var("CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let settings = Config::builder()
        .add_source(File::with_name(&config_path))
        .add_source(Environment::default().separator("__"))
        .build()
        .map_err(|e| std::io::Error::other(format!("Failed to load configuration: {e}")))?;
    let server_config: ServerConfig = settings
        .try_deserialize()
        .map_err(|e| std::io::Error::other(format!("Invalid configuration: {e}")))?;

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

    let today = Utc::now().date_naive();
    match invoices::mark_overdue_invoices(&repo, today) {
        Ok(count) => log::info!("Marked {count} invoices overdue"),
        Err(e) => log::error!("Overdue sweep failed: {e}"),
    }

    let cutoff = Utc::now().naive_utc() - Duration::days(1);
    match invoices::cancel_stale_failed_payments(&repo, &gateway, cutoff).await {
        Ok(count) => log::info!("Canceled {count} stale failed payments"),
        Err(e) => log::error!("Stale payment sweep failed: {e}"),
    }

    Ok(())
}
