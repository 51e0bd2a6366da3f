//! Re-run the market-cap segmentation sweep over every stored row.

use crypto_market_pipeline::PipelineConfig;
use crypto_market_pipeline::jobs::market_pipeline::{PostgresConnector, segment};
use crypto_market_pipeline::models::tier::MarketCapTier;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = PipelineConfig::from_env()?;
    let storage = PostgresConnector::new(config.database_url);

    tracing::info!("Starting market cap segmentation of crypto_prices...");

    let report = segment(&storage).await?;

    tracing::info!("=== Segmentation Complete ===");
    tracing::info!("Rows scanned: {}", report.scanned);
    tracing::info!("Rows updated: {}", report.updated);
    for tier in MarketCapTier::ALL {
        tracing::info!("{}: {}", tier, report.count_for(tier));
    }
    tracing::info!("Unclassified (no market cap): {}", report.unclassified);

    if !report.failures.is_empty() {
        tracing::warn!("{} rows failed to update", report.failures.len());
        for failure in &report.failures {
            tracing::warn!("  {} at {}: {}", failure.coin_id, failure.timestamp, failure.error);
        }
    }

    Ok(())
}
