//! Market-cap segmentation sweep.
//!
//! Reads `(timestamp, coin_id, market_cap)` for every stored row, classifies
//! each into a [`MarketCapTier`], and writes the label back one row at a time.
//! Row updates are independent: a failed row is recorded and skipped.

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::collections::BTreeMap;

use crate::entities::{crypto_prices, prelude::*};
use crate::error::PipelineError;
use crate::models::tier::MarketCapTier;

/// Minimal projection read back for classification.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct TierCandidate {
    pub timestamp: DateTime<Utc>,
    pub coin_id: String,
    pub market_cap: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierAssignment {
    pub timestamp: DateTime<Utc>,
    pub coin_id: String,
    /// `None` when the row has no market cap to classify
    pub tier: Option<MarketCapTier>,
}

#[derive(Debug)]
pub struct RowFailure {
    pub timestamp: DateTime<Utc>,
    pub coin_id: String,
    pub error: DbErr,
}

#[derive(Debug, Default)]
pub struct SegmentationReport {
    pub scanned: usize,
    /// Rows actually updated, as reported by the database
    pub updated: u64,
    pub failures: Vec<RowFailure>,
    pub tier_counts: BTreeMap<MarketCapTier, usize>,
    pub unclassified: usize,
}

impl SegmentationReport {
    pub fn count_for(&self, tier: MarketCapTier) -> usize {
        self.tier_counts.get(&tier).copied().unwrap_or(0)
    }
}

pub fn assign_tiers(candidates: Vec<TierCandidate>) -> Vec<TierAssignment> {
    candidates
        .into_iter()
        .map(|row| TierAssignment {
            tier: row.market_cap.map(MarketCapTier::classify),
            timestamp: row.timestamp,
            coin_id: row.coin_id,
        })
        .collect()
}

pub async fn load_tier_candidates(
    db: &DatabaseConnection,
) -> Result<Vec<TierCandidate>, PipelineError> {
    CryptoPrices::find()
        .select_only()
        .column(crypto_prices::Column::Timestamp)
        .column(crypto_prices::Column::CoinId)
        .column(crypto_prices::Column::MarketCap)
        .order_by_asc(crypto_prices::Column::Id)
        .into_model::<TierCandidate>()
        .all(db)
        .await
        .map_err(PipelineError::StorageRead)
}

async fn write_tier(db: &DatabaseConnection, assignment: &TierAssignment) -> Result<u64, DbErr> {
    let label = assignment.tier.map(|tier| tier.label().to_string());

    let result = CryptoPrices::update_many()
        .col_expr(crypto_prices::Column::MarketCapTier, Expr::value(label))
        .filter(crypto_prices::Column::Timestamp.eq(assignment.timestamp))
        .filter(crypto_prices::Column::CoinId.eq(assignment.coin_id.as_str()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Write every assignment, folding per-row outcomes into a report.
pub async fn apply_tiers(
    db: &DatabaseConnection,
    assignments: Vec<TierAssignment>,
) -> SegmentationReport {
    let initial = SegmentationReport {
        scanned: assignments.len(),
        ..Default::default()
    };

    stream::iter(assignments)
        .fold(initial, |mut report, assignment| async move {
            match write_tier(db, &assignment).await {
                Ok(rows) => {
                    report.updated += rows;
                    match assignment.tier {
                        Some(tier) => *report.tier_counts.entry(tier).or_insert(0) += 1,
                        None => report.unclassified += 1,
                    }
                }
                Err(error) => {
                    tracing::error!(
                        "Error updating tier for {} at {}: {}",
                        assignment.coin_id,
                        assignment.timestamp,
                        error
                    );
                    report.failures.push(RowFailure {
                        timestamp: assignment.timestamp,
                        coin_id: assignment.coin_id,
                        error,
                    });
                }
            }
            report
        })
        .await
}

/// Classify and tag every stored row.
pub async fn run_segmentation(db: &DatabaseConnection) -> Result<SegmentationReport, PipelineError> {
    tracing::info!("Fetching crypto_prices rows for segmentation...");

    let candidates = load_tier_candidates(db).await?;
    tracing::info!("Fetched {} rows for segmentation", candidates.len());

    let assignments = assign_tiers(candidates);
    for assignment in assignments.iter().take(10) {
        tracing::debug!(
            "  {} -> {}",
            assignment.coin_id,
            assignment.tier.map(MarketCapTier::label).unwrap_or("unclassified")
        );
    }

    let report = apply_tiers(db, assignments).await;

    tracing::info!(
        "Updated market_cap_tier on {} of {} rows ({} failed)",
        report.updated,
        report.scanned,
        report.failures.len()
    );
    for tier in MarketCapTier::ALL {
        tracing::debug!("  {}: {}", tier, report.count_for(tier));
    }

    Ok(report)
}
