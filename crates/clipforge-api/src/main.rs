mod error;
mod handlers;
mod setup;
mod state;
mod telemetry;

use clipforge_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env before reading configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    telemetry::init_tracing(&config);

    let (_state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router).await?;

    Ok(())
}
