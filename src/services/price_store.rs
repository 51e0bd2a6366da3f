use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use std::collections::HashMap;
use sea_orm::{DatabaseConnection, EntityTrait, Set, TransactionTrait};

use crate::entities::{crypto_prices, prelude::*};
use crate::error::PipelineError;
use crate::models::market::PricePoint;

impl From<&PricePoint> for crypto_prices::ActiveModel {
    fn from(point: &PricePoint) -> Self {
        Self {
            timestamp: Set(point.timestamp),
            coin_id: Set(point.coin_id.clone()),
            symbol: Set(point.symbol.clone()),
            name: Set(point.name.clone()),
            current_price: Set(point.current_price),
            market_cap: Set(point.market_cap),
            total_volume: Set(point.total_volume),
            high_24h: Set(point.high_24h),
            low_24h: Set(point.low_24h),
            price_change_24h: Set(point.price_change_24h),
            price_change_percentage_24h: Set(point.price_change_percentage_24h),
            market_cap_change_24h: Set(point.market_cap_change_24h),
            market_cap_change_percentage_24h: Set(point.market_cap_change_percentage_24h),
            circulating_supply: Set(point.circulating_supply),
            total_supply: Set(point.total_supply),
            max_supply: Set(point.max_supply),
            ath: Set(point.ath),
            atl: Set(point.atl),
            ..Default::default()
        }
    }
}

/// Value columns rewritten when (timestamp, coin_id) already exists.
const UPSERT_UPDATE_COLUMNS: [crypto_prices::Column; 16] = [
    crypto_prices::Column::Symbol,
    crypto_prices::Column::Name,
    crypto_prices::Column::CurrentPrice,
    crypto_prices::Column::MarketCap,
    crypto_prices::Column::TotalVolume,
    crypto_prices::Column::High24h,
    crypto_prices::Column::Low24h,
    crypto_prices::Column::PriceChange24h,
    crypto_prices::Column::PriceChangePercentage24h,
    crypto_prices::Column::MarketCapChange24h,
    crypto_prices::Column::MarketCapChangePercentage24h,
    crypto_prices::Column::CirculatingSupply,
    crypto_prices::Column::TotalSupply,
    crypto_prices::Column::MaxSupply,
    crypto_prices::Column::Ath,
    crypto_prices::Column::Atl,
];

/// Collapse points sharing a (timestamp, coin_id) key, the last one winning.
///
/// Keeps the position of the first occurrence. Postgres refuses an
/// `ON CONFLICT DO UPDATE` statement that touches the same row twice.
pub fn dedupe_by_key(points: &[PricePoint]) -> Vec<&PricePoint> {
    let mut positions: HashMap<(DateTime<Utc>, &str), usize> = HashMap::new();
    let mut unique: Vec<&PricePoint> = Vec::with_capacity(points.len());

    for point in points {
        match positions.get(&(point.timestamp, point.coin_id.as_str())) {
            Some(&index) => unique[index] = point,
            None => {
                positions.insert((point.timestamp, point.coin_id.as_str()), unique.len());
                unique.push(point);
            }
        }
    }

    unique
}

/// Insert or update a batch of price points in a single statement.
///
/// The whole batch runs in one transaction: either every row lands or the
/// batch is rolled back and reported as one `StorageWrite` error.
pub async fn upsert_price_points(
    db: &DatabaseConnection,
    points: &[PricePoint],
) -> Result<u64, PipelineError> {
    if points.is_empty() {
        tracing::info!("No price points to store");
        return Ok(0);
    }

    let unique = dedupe_by_key(points);
    if unique.len() < points.len() {
        tracing::warn!(
            "Dropped {} duplicate (timestamp, coin_id) entries from batch of {}",
            points.len() - unique.len(),
            points.len()
        );
    }

    let models: Vec<crypto_prices::ActiveModel> =
        unique.into_iter().map(Into::into).collect();

    let txn = db.begin().await.map_err(PipelineError::StorageConnect)?;

    let insert_result = CryptoPrices::insert_many(models)
        .on_conflict(
            OnConflict::columns([crypto_prices::Column::Timestamp, crypto_prices::Column::CoinId])
                .update_columns(UPSERT_UPDATE_COLUMNS)
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await;

    let rows_affected = match insert_result {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Batch upsert of {} price points failed: {}", points.len(), e);
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Rollback failed: {}", rollback_err);
            }
            return Err(PipelineError::StorageWrite(e));
        }
    };

    txn.commit().await.map_err(PipelineError::StorageWrite)?;

    tracing::info!(
        "✅ Inserted/updated {} rows for {} price points",
        rows_affected,
        points.len()
    );

    Ok(rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    fn point(coin_id: &str) -> PricePoint {
        PricePoint {
            timestamp: Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
            coin_id: coin_id.to_string(),
            symbol: None,
            name: None,
            current_price: Some(dec!(1.5)),
            market_cap: Some(dec!(500000000)),
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
        }
    }

    #[test]
    fn test_active_model_carries_key_and_values() {
        let model: crypto_prices::ActiveModel = (&point("solana")).into();

        assert_eq!(model.coin_id, Set("solana".to_string()));
        assert_eq!(model.current_price, Set(Some(dec!(1.5))));
        assert_eq!(model.max_supply, Set(None));
        assert!(model.id.is_not_set());
        assert!(model.market_cap_tier.is_not_set());
    }

    #[test]
    fn test_dedupe_keeps_last_value_at_first_position() {
        let mut repeated = point("ethereum");
        repeated.current_price = Some(dec!(2.75));
        let points = vec![point("bitcoin"), point("ethereum"), point("tether"), repeated];

        let unique = dedupe_by_key(&points);

        let ids: Vec<&str> = unique.iter().map(|p| p.coin_id.as_str()).collect();
        assert_eq!(ids, vec!["bitcoin", "ethereum", "tether"]);
        assert_eq!(unique[1].current_price, Some(dec!(2.75)));
    }

    #[test]
    fn test_dedupe_keeps_distinct_timestamps() {
        let mut later = point("bitcoin");
        later.timestamp = Utc.with_ymd_and_hms(2026, 10, 16, 12, 5, 0).unwrap();
        let points = vec![point("bitcoin"), later];

        assert_eq!(dedupe_by_key(&points).len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_with_repeated_coin_sends_one_statement() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let points = vec![point("bitcoin"), point("ethereum"), point("bitcoin")];
        let affected = upsert_price_points(&db, &points).await.unwrap();

        assert_eq!(affected, 2);
    }

    #[tokio::test]
    async fn test_upsert_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        let points = vec![point("bitcoin"), point("ethereum"), point("tether")];
        let affected = upsert_price_points(&db, &points).await.unwrap();

        assert_eq!(affected, 3);
    }

    #[tokio::test]
    async fn test_upsert_failure_is_a_single_write_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom("unique violation".to_string())])
            .into_connection();

        let err = upsert_price_points(&db, &[point("bitcoin"), point("ethereum")])
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::StorageWrite(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_does_not_touch_storage() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let affected = upsert_price_points(&db, &[]).await.unwrap();

        assert_eq!(affected, 0);
        assert!(db.into_transaction_log().is_empty());
    }
}
