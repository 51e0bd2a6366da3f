//! One end-to-end run: fetch → transform → upsert, then the segmentation
//! sweep over the whole table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

use crate::config::FetchSettings;
use crate::error::PipelineError;
use crate::models::market::PricePoint;
use crate::services::markets::{MarketsSource, fetch_all};
use crate::services::price_store::upsert_price_points;
use crate::services::segmentation::{SegmentationReport, run_segmentation};
use crate::services::transform::{capture_timestamp, transform};

/// Hands out a fresh storage connection for each component.
#[async_trait]
pub trait StorageConnector: Send + Sync {
    async fn connect(&self) -> Result<DatabaseConnection, PipelineError>;
}

/// Single-connection Postgres access.
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    database_url: String,
}

impl PostgresConnector {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }
}

#[async_trait]
impl StorageConnector for PostgresConnector {
    async fn connect(&self) -> Result<DatabaseConnection, PipelineError> {
        let mut options = ConnectOptions::new(self.database_url.clone());
        options
            .max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        Database::connect(options)
            .await
            .map_err(PipelineError::StorageConnect)
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    /// Nothing was fetched, so nothing was written
    Skipped,
    Upserted(u64),
    Failed(PipelineError),
}

#[derive(Debug)]
pub struct PipelineRun {
    pub captured_at: DateTime<Utc>,
    pub fetched: usize,
    /// Target row count reached without a failed page
    pub fetch_complete: bool,
    pub fetch_error: Option<PipelineError>,
    pub load: LoadOutcome,
    pub segmentation: Result<SegmentationReport, PipelineError>,
}

impl PipelineRun {
    /// First storage failure of the run, if any.
    ///
    /// Fetch failures are not included: they only shorten the batch.
    pub fn storage_error(&self) -> Option<&PipelineError> {
        match (&self.load, &self.segmentation) {
            (LoadOutcome::Failed(e), _) => Some(e),
            (_, Err(e)) => Some(e),
            _ => None,
        }
    }
}

pub async fn run_pipeline<S, C>(source: &S, storage: &C, settings: &FetchSettings) -> PipelineRun
where
    S: MarketsSource + ?Sized,
    C: StorageConnector + ?Sized,
{
    tracing::info!("--- Starting crypto market pipeline ---");

    let fetch = fetch_all(source, settings).await;
    if fetch.error.is_some() {
        tracing::warn!(
            "Fetch stopped early after {} pages; continuing with {} records",
            fetch.pages_fetched,
            fetch.records.len()
        );
    }

    let captured_at = capture_timestamp();
    let fetched = fetch.records.len();
    let fetch_complete = fetch.is_complete(settings.target_rows);

    let load = if fetch.records.is_empty() {
        tracing::warn!("No data fetched. Please check API connection or parameters.");
        LoadOutcome::Skipped
    } else {
        let points = transform(&fetch.records, captured_at);
        tracing::info!("Transformed {} records captured at {}", points.len(), captured_at);

        match load_points(storage, &points).await {
            Ok(rows) => LoadOutcome::Upserted(rows),
            Err(e) => {
                tracing::error!("Load failed: {}", e);
                LoadOutcome::Failed(e)
            }
        }
    };

    let segmentation = segment(storage).await;
    if let Err(e) = &segmentation {
        tracing::error!("Segmentation failed: {}", e);
    }

    tracing::info!("--- Crypto market pipeline finished ---");

    PipelineRun {
        captured_at,
        fetched,
        fetch_complete,
        fetch_error: fetch.error,
        load,
        segmentation,
    }
}

async fn load_points<C>(
    storage: &C,
    points: &[PricePoint],
) -> Result<u64, PipelineError>
where
    C: StorageConnector + ?Sized,
{
    let db = storage.connect().await?;
    upsert_price_points(&db, points).await
}

pub async fn segment<C>(storage: &C) -> Result<SegmentationReport, PipelineError>
where
    C: StorageConnector + ?Sized,
{
    let db = storage.connect().await?;
    run_segmentation(&db).await
}
