#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crypto_market_pipeline::PipelineError;
use crypto_market_pipeline::entities::crypto_prices;
use crypto_market_pipeline::jobs::market_pipeline::StorageConnector;
use crypto_market_pipeline::models::market::RawAssetRecord;
use crypto_market_pipeline::services::markets::MarketsSource;
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection, DbErr};
use std::collections::VecDeque;
use std::env;
use std::sync::Mutex;

/// Set up test database connection
/// Uses TEST_DATABASE_URL environment variable or falls back to default
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
        "postgresql://crypto_user@localhost:5432/crypto_test".to_string()
    });

    Database::connect(&database_url).await
}

/// Serves a fixed list of records, `page_size` at a time.
pub struct StaticSource {
    records: Vec<RawAssetRecord>,
    page_size: usize,
}

impl StaticSource {
    pub fn new(records: Vec<RawAssetRecord>) -> Self {
        Self {
            page_size: records.len().max(1),
            records,
        }
    }
}

#[async_trait]
impl MarketsSource for StaticSource {
    async fn fetch_page(
        &self,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<RawAssetRecord>, PipelineError> {
        let size = per_page.min(self.page_size);
        let start = (page as usize - 1) * size;
        Ok(self.records.iter().skip(start).take(size).cloned().collect())
    }
}

/// Pages by offset like CoinGecko: page `n` serves ranks starting at
/// `(n - 1) * page_size`, so a shrinking page overlaps earlier ones.
pub struct OffsetSource {
    pub total: usize,
    pub page_cap: usize,
}

#[async_trait]
impl MarketsSource for OffsetSource {
    async fn fetch_page(
        &self,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<RawAssetRecord>, PipelineError> {
        let size = per_page.min(self.page_cap);
        let start = (page as usize - 1) * size;
        let end = (start + size).min(self.total);
        Ok((start..end)
            .map(|rank| raw_record(&format!("rank-{}", rank), 1e9 + rank as f64))
            .collect())
    }
}

/// Source whose every page fails with the given status.
pub struct FailingSource(pub u16);

#[async_trait]
impl MarketsSource for FailingSource {
    async fn fetch_page(
        &self,
        _page: u32,
        _per_page: usize,
    ) -> Result<Vec<RawAssetRecord>, PipelineError> {
        Err(PipelineError::UpstreamStatus {
            status: self.0,
            body: "unavailable".to_string(),
        })
    }
}

/// Hands out prepared connections in order; `None` entries fail to connect.
pub struct ScriptedConnector {
    connections: Mutex<VecDeque<Option<DatabaseConnection>>>,
}

impl ScriptedConnector {
    pub fn new(connections: Vec<Option<DatabaseConnection>>) -> Self {
        Self {
            connections: Mutex::new(connections.into()),
        }
    }
}

#[async_trait]
impl StorageConnector for ScriptedConnector {
    async fn connect(&self) -> Result<DatabaseConnection, PipelineError> {
        let next = self.connections.lock().unwrap().pop_front().flatten();
        next.ok_or_else(|| {
            PipelineError::StorageConnect(DbErr::Custom("connection refused".to_string()))
        })
    }
}

pub fn raw_record(id: &str, market_cap: f64) -> RawAssetRecord {
    RawAssetRecord {
        id: id.to_string(),
        symbol: Some(id[..3.min(id.len())].to_string()),
        name: Some(id.to_string()),
        current_price: Some(1.25),
        market_cap: Some(market_cap),
        ..Default::default()
    }
}

pub fn stored_row(
    id: i64,
    timestamp: DateTime<Utc>,
    coin_id: &str,
    market_cap: Option<Decimal>,
) -> crypto_prices::Model {
    crypto_prices::Model {
        id,
        timestamp,
        coin_id: coin_id.to_string(),
        symbol: None,
        name: None,
        current_price: None,
        market_cap,
        total_volume: None,
        high_24h: None,
        low_24h: None,
        price_change_24h: None,
        price_change_percentage_24h: None,
        market_cap_change_24h: None,
        market_cap_change_percentage_24h: None,
        circulating_supply: None,
        total_supply: None,
        max_supply: None,
        ath: None,
        atl: None,
        market_cap_tier: None,
        created_at: None,
    }
}
