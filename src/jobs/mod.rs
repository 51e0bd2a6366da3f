pub mod market_pipeline;
