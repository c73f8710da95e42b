mod config;

use std::sync::Arc;

use anyhow::Context;
use claim_lifecycle::{PostgresClaimStore, RandomContent, ReferenceData, TickScheduler};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::SimulatorConfig;

/// Initialize tracing based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "quote_lifecycle_simulator=info,claim_lifecycle=info".into()
    });

    match log_format.as_str() {
        "pretty" => {
            // Human-readable logging for development
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            // Structured JSON logging for production
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = SimulatorConfig::from_env().context("Invalid configuration")?;

    let store = PostgresClaimStore::connect_with(config.database.connect_options())
        .await
        .with_context(|| {
            format!(
                "Failed to connect to postgres at {}:{}",
                config.database.host, config.database.port
            )
        })?;
    info!("Successfully connected to postgres database");

    let reference = ReferenceData::default();
    let content = match config.seed {
        Some(seed) => {
            info!(seed, "Using fixed random seed");
            RandomContent::seeded(reference, seed)
        }
        None => RandomContent::from_entropy(reference),
    };

    let scheduler = TickScheduler::new(Arc::new(store), content, config.scheduler);
    scheduler.run().await.context("Simulation stopped")?;

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    info!("Starting quote lifecycle simulator");

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
