//! Paginated extraction of market listings.
//!
//! `fetch_all` walks pages from 1 until the target row count is reached, a
//! page comes back empty, or a page fails. Whatever was accumulated before the
//! stop is handed back to the caller.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::FetchSettings;
use crate::error::PipelineError;
use crate::models::market::RawAssetRecord;

/// A paginated source of market records.
#[async_trait]
pub trait MarketsSource: Send + Sync {
    /// Fetch a single 1-based page holding up to `per_page` records.
    async fn fetch_page(
        &self,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<RawAssetRecord>, PipelineError>;
}

/// Result of one fetch phase.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<RawAssetRecord>,
    pub pages_fetched: u32,
    /// Set when pagination ended on a failed page.
    pub error: Option<PipelineError>,
}

impl FetchOutcome {
    pub fn is_complete(&self, target_rows: usize) -> bool {
        self.error.is_none() && self.records.len() >= target_rows
    }
}

pub async fn fetch_all<S>(source: &S, settings: &FetchSettings) -> FetchOutcome
where
    S: MarketsSource + ?Sized,
{
    fetch_all_with(source, settings.target_rows, settings.max_per_page, settings.request_delay).await
}

pub async fn fetch_all_with<S>(
    source: &S,
    target_rows: usize,
    max_per_page: usize,
    delay: Duration,
) -> FetchOutcome
where
    S: MarketsSource + ?Sized,
{
    let mut outcome = FetchOutcome::default();
    let mut page: u32 = 1;

    while outcome.records.len() < target_rows {
        let per_page = max_per_page.min(target_rows - outcome.records.len());
        if per_page == 0 {
            break;
        }

        if page > 1 && !delay.is_zero() {
            sleep(delay).await;
        }

        match source.fetch_page(page, per_page).await {
            Ok(records) if records.is_empty() => {
                tracing::warn!("Page {} returned no records, stopping pagination", page);
                break;
            }
            Ok(records) => {
                tracing::info!("Fetched {} records from page {}", records.len(), page);
                outcome.records.extend(records);
                outcome.pages_fetched += 1;
                page += 1;
            }
            Err(e) => {
                tracing::error!("Failed to fetch page {}: {}. Stopping.", page, e);
                outcome.error = Some(e);
                break;
            }
        }
    }

    outcome.records.truncate(target_rows);
    outcome
}
