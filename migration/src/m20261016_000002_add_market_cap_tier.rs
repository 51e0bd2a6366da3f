use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(CryptoPrices::Table)
                    .add_column(
                        ColumnDef::new(CryptoPrices::MarketCapTier)
                            .string_len(16)
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_crypto_prices_market_cap_tier")
                    .table(CryptoPrices::Table)
                    .col(CryptoPrices::MarketCapTier)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_crypto_prices_market_cap_tier")
                    .table(CryptoPrices::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(CryptoPrices::Table)
                    .drop_column(CryptoPrices::MarketCapTier)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum CryptoPrices {
    Table,
    MarketCapTier,
}
