use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CryptoPrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CryptoPrices::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::CoinId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CryptoPrices::Symbol).string().null())
                    .col(ColumnDef::new(CryptoPrices::Name).string().null())
                    .col(&mut amount(CryptoPrices::CurrentPrice))
                    .col(&mut amount(CryptoPrices::MarketCap))
                    .col(&mut amount(CryptoPrices::TotalVolume))
                    .col(&mut amount(CryptoPrices::High24h))
                    .col(&mut amount(CryptoPrices::Low24h))
                    .col(&mut amount(CryptoPrices::PriceChange24h))
                    .col(&mut amount(CryptoPrices::PriceChangePercentage24h))
                    .col(&mut amount(CryptoPrices::MarketCapChange24h))
                    .col(&mut amount(CryptoPrices::MarketCapChangePercentage24h))
                    .col(&mut amount(CryptoPrices::CirculatingSupply))
                    .col(&mut amount(CryptoPrices::TotalSupply))
                    .col(&mut amount(CryptoPrices::MaxSupply))
                    .col(&mut amount(CryptoPrices::Ath))
                    .col(&mut amount(CryptoPrices::Atl))
                    .col(
                        ColumnDef::new(CryptoPrices::CreatedAt)
                            .timestamp()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Upsert target: one row per coin per capture time
        manager
            .create_index(
                Index::create()
                    .name("idx_crypto_prices_timestamp_coin_unique")
                    .table(CryptoPrices::Table)
                    .col(CryptoPrices::Timestamp)
                    .col(CryptoPrices::CoinId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_crypto_prices_coin_timestamp")
                    .table(CryptoPrices::Table)
                    .col(CryptoPrices::CoinId)
                    .col(CryptoPrices::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CryptoPrices::Table).to_owned())
            .await
    }
}

fn amount(column: CryptoPrices) -> ColumnDef {
    ColumnDef::new(column).decimal().null().to_owned()
}

#[derive(DeriveIden)]
enum CryptoPrices {
    Table,
    Id,
    Timestamp,
    CoinId,
    Symbol,
    Name,
    CurrentPrice,
    MarketCap,
    TotalVolume,
    #[sea_orm(iden = "high_24h")]
    High24h,
    #[sea_orm(iden = "low_24h")]
    Low24h,
    #[sea_orm(iden = "price_change_24h")]
    PriceChange24h,
    #[sea_orm(iden = "price_change_percentage_24h")]
    PriceChangePercentage24h,
    #[sea_orm(iden = "market_cap_change_24h")]
    MarketCapChange24h,
    #[sea_orm(iden = "market_cap_change_percentage_24h")]
    MarketCapChangePercentage24h,
    CirculatingSupply,
    TotalSupply,
    MaxSupply,
    Ath,
    Atl,
    CreatedAt,
}
