//! Raw CoinGecko records to `PricePoint` rows.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;

use crate::models::market::{PricePoint, RawAssetRecord};

/// Capture time for a new batch, truncated to the microsecond precision
/// Postgres keeps for `timestamptz` so the key reads back unchanged.
pub fn capture_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Map every raw record to a `PricePoint` stamped with `timestamp`.
///
/// One output per input, in input order.
pub fn transform(raw: &[RawAssetRecord], timestamp: DateTime<Utc>) -> Vec<PricePoint> {
    raw.iter().map(|record| to_price_point(record, timestamp)).collect()
}

fn to_price_point(record: &RawAssetRecord, timestamp: DateTime<Utc>) -> PricePoint {
    PricePoint {
        timestamp,
        coin_id: record.id.clone(),
        symbol: record.symbol.clone(),
        name: record.name.clone(),
        current_price: to_decimal(record.current_price),
        market_cap: to_decimal(record.market_cap),
        total_volume: to_decimal(record.total_volume),
        high_24h: to_decimal(record.high_24h),
        low_24h: to_decimal(record.low_24h),
        price_change_24h: to_decimal(record.price_change_24h),
        price_change_percentage_24h: to_decimal(record.price_change_percentage_24h),
        market_cap_change_24h: to_decimal(record.market_cap_change_24h),
        market_cap_change_percentage_24h: to_decimal(record.market_cap_change_percentage_24h),
        circulating_supply: to_decimal(record.circulating_supply),
        total_supply: to_decimal(record.total_supply),
        max_supply: to_decimal(record.max_supply),
        ath: to_decimal(record.ath),
        atl: to_decimal(record.atl),
    }
}

// NaN and infinities have no decimal form and are stored as NULL
fn to_decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(Decimal::from_f64_retain)
}
