//! Hedgehog Strength Finder - Main Entry Point
//!
//! Starts the web server for the Hedgehog Concept profile tool.

use hedgehog_finder::{api::run_server, config::AppConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // .env must be loaded before the logger reads RUST_LOG
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    println!("╔════════════════════════════════════════════════╗");
    println!("║   Hedgehog Strength Finder                     ║");
    println!("║   Passion → Strength → Market Need             ║");
    println!("╚════════════════════════════════════════════════╝");
    println!();

    if dotenv_loaded {
        log::info!("Loaded configuration from .env");
    }

    let config = AppConfig::from_env();
    if config.api_key.is_none() {
        log::warn!("GOOGLE_API_KEY is not set; analysis requests will report a configuration error");
    }

    run_server(config).await
}
