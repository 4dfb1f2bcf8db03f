//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// Secret used to verify bearer tokens issued by the auth service.
    pub secret: String,
    pub auth_service_url: String,
    /// Payment processor API key.
    pub processor_secret_key: String,
    /// Shared secret used to verify processor webhook signatures.
    pub processor_webhook_secret: String,
    /// Processor price ids per plan.
    pub price_standard: String,
    pub price_premium: String,
    /// Default number of days until a sent invoice is due.
    pub invoice_due_days: u32,
}
