use std::error::Error;

use ai_llm_service::telemetry;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file when present;
    // the process environment alone is a valid configuration.
    dotenvy::dotenv().ok();

    // RUST_LOG as given; when unset, INFO globally and DEBUG for workspace crates.
    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::DEBUG))
        .with(telemetry::layer())
        .try_init()?;

    api::start().await?;

    Ok(())
}
