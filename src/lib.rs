// src/lib.rs

pub mod config;
pub mod error;

pub mod entities {
    pub mod prelude;
    pub mod crypto_prices;
}

pub mod services {
    pub mod coingecko;
    pub mod markets;
    pub mod transform;
    pub mod price_store;
    pub mod segmentation;
}

pub mod models;
pub mod jobs;

pub use config::PipelineConfig;
pub use error::PipelineError;
