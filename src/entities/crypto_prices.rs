//! `SeaORM` Entity for the crypto_prices table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crypto_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Capture time of the batch this row belongs to
    pub timestamp: DateTimeUtc,
    /// CoinGecko coin id, e.g. "bitcoin"
    pub coin_id: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub current_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub market_cap: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub total_volume: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub high_24h: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub low_24h: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub price_change_24h: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub price_change_percentage_24h: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub market_cap_change_24h: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub market_cap_change_percentage_24h: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub circulating_supply: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub total_supply: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub max_supply: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub ath: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub atl: Option<Decimal>,
    /// Label written by the segmentation sweep, e.g. "Mid"
    pub market_cap_tier: Option<String>,
    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
