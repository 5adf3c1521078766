use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use getaway::api::AppState;
use getaway::{
    AmadeusClient, ClientCredentialsIssuer, GetawayConfig, GetawayService, OpenWeatherClient,
    telemetry, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = GetawayConfig::load_from_path(config_path)?;

    let tracer_provider = telemetry::init(&config.logging)?;
    info!("Starting getaway {}", getaway::VERSION);

    let travel = AmadeusClient::new(&config.amadeus, &config.search)
        .context("Failed to create travel data client")?;
    let issuer =
        ClientCredentialsIssuer::new(&config.amadeus).context("Failed to create token issuer")?;
    let weather =
        OpenWeatherClient::new(&config.weather).context("Failed to create weather client")?;

    let service = GetawayService::new(travel, issuer, weather, config.search.clone());
    let state = AppState::new(Arc::new(service), config.search.flight_budget_ratio);

    let result = web::run(&config.server, state).await;
    if let Err(e) = &result {
        error!("{:#}", e);
    }

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("Failed to flush traces: {e}");
        }
    }

    result
}
