use async_trait::async_trait;
use reqwest::Client;

use crate::config::CoinGeckoConfig;
use crate::error::PipelineError;
use crate::models::market::RawAssetRecord;
use crate::services::markets::MarketsSource;

/// Client for the CoinGecko `/coins/markets` listing.
#[derive(Clone)]
pub struct CoinGeckoService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    vs_currency: String,
    price_change_windows: String,
}

impl CoinGeckoService {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            vs_currency: crate::config::DEFAULT_VS_CURRENCY.to_string(),
            price_change_windows: crate::config::DEFAULT_PRICE_CHANGE_WINDOWS.to_string(),
        }
    }

    pub fn from_config(config: &CoinGeckoConfig) -> Self {
        Self {
            vs_currency: config.vs_currency.clone(),
            price_change_windows: config.price_change_windows.clone(),
            ..Self::new(config.api_key.clone(), config.base_url.clone())
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn vs_currency(&self) -> &str {
        &self.vs_currency
    }

    /// Fetch one page of market listings for the configured currency.
    pub async fn fetch_markets_page(
        &self,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<RawAssetRecord>, PipelineError> {
        let url = format!("{}/coins/markets", self.base_url);

        tracing::info!(
            "Fetching {} markets page {} (per_page={}) from CoinGecko",
            self.vs_currency,
            page,
            per_page
        );

        let mut request = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .query(&[
                ("vs_currency", self.vs_currency.as_str()),
                ("per_page", &per_page.to_string()),
                ("page", &page.to_string()),
                ("sparkline", "false"),
                ("price_change_percentage", self.price_change_windows.as_str()),
            ]);

        if let Some(api_key) = &self.api_key {
            request = request.header("x-cg-pro-api-key", api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let records = parse_markets_payload(&body)?;

        tracing::debug!("Fetched {} coins for page {}", records.len(), page);

        Ok(records)
    }
}

#[async_trait]
impl MarketsSource for CoinGeckoService {
    async fn fetch_page(
        &self,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<RawAssetRecord>, PipelineError> {
        self.fetch_markets_page(page, per_page).await
    }
}

/// Decode a `/coins/markets` response body.
pub fn parse_markets_payload(body: &str) -> Result<Vec<RawAssetRecord>, PipelineError> {
    Ok(serde_json::from_str(body)?)
}
