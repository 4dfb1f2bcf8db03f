use std::env;

use config::{Config, Environment, File};
use dotenvy::dotenv;

use accord_crm::models::config::ServerConfig;

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

    accord_crm::run(server_config).await
}
