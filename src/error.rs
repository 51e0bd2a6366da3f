//! Error taxonomy for the market pipeline.
//!
//! Fetch errors end the current pagination loop, storage errors abort the
//! component that hit them. Nothing here is retried.

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Request could not be sent or the response body could not be read.
    #[error("Network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream answered with a non-success HTTP status.
    #[error("CoinGecko API error {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Upstream answered 2xx but the body is not a list of market records.
    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Storage connection failed: {0}")]
    StorageConnect(#[source] DbErr),

    #[error("Storage write failed: {0}")]
    StorageWrite(#[source] DbErr),

    #[error("Storage read failed: {0}")]
    StorageRead(#[source] DbErr),

    #[error("Migration failed: {0}")]
    Migration(#[source] DbErr),

    #[error("Invalid configuration for {key}: {message}")]
    Config { key: &'static str, message: String },
}
