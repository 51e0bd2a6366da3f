use crypto_market_pipeline::PipelineConfig;
use crypto_market_pipeline::jobs::market_pipeline::{
    LoadOutcome, PostgresConnector, StorageConnector, run_pipeline,
};
use crypto_market_pipeline::services::coingecko::CoinGeckoService;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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
    let storage = PostgresConnector::new(config.database_url.clone());

    // Run migrations
    tracing::info!("Running migrations...");
    {
        let db = storage.connect().await?;
        migration::Migrator::up(&db, None)
            .await
            .map_err(crypto_market_pipeline::PipelineError::Migration)?;
    }

    let coingecko = CoinGeckoService::from_config(&config.coingecko);
    tracing::info!(
        "Source: {} ({}), target {} rows",
        coingecko.base_url(),
        coingecko.vs_currency(),
        config.fetch.target_rows
    );

    let run = run_pipeline(&coingecko, &storage, &config.fetch).await;

    tracing::info!("=== Pipeline Summary ===");
    tracing::info!("Captured at: {}", run.captured_at);
    if run.fetch_complete {
        tracing::info!("Fetched: {} / {}", run.fetched, config.fetch.target_rows);
    } else {
        tracing::warn!(
            "Fetched: {} / {} (short batch)",
            run.fetched,
            config.fetch.target_rows
        );
    }
    if let Some(e) = &run.fetch_error {
        tracing::warn!("Fetch stopped early: {}", e);
    }
    match &run.load {
        LoadOutcome::Skipped => tracing::info!("Load: skipped"),
        LoadOutcome::Upserted(rows) => tracing::info!("Load: {} rows inserted/updated", rows),
        LoadOutcome::Failed(e) => tracing::error!("Load: failed ({})", e),
    }
    if let Ok(report) = &run.segmentation {
        tracing::info!(
            "Segmentation: {} of {} rows updated, {} errors",
            report.updated,
            report.scanned,
            report.failures.len()
        );
    }

    if let Some(e) = run.storage_error() {
        return Err(format!("pipeline finished with storage failure: {}", e).into());
    }

    Ok(())
}
